//! Calibrate command implementation.
//!
//! Loads a basket file, fits the Nelson-Siegel parameters to the
//! instruments' reference prices and prints the fit and the fitted curve.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use siegel_curves::calibration::{CalibrationResult, Calibrator, PriceFit};
use siegel_curves::evaluation::{evaluate_curve, maturity_fit, CurvePoint, MaturityFit};
use siegel_curves::prelude::OptimizerMethod;

use crate::basket_file::BasketFile;
use crate::cli::{GridArgs, OutputFormat};
use crate::commands::curve::parameter_rows;
use crate::commands::{grid, CurveRow};
use crate::output::{
    format_percent, print_csv, print_header, print_json, print_output, print_success,
    print_warning, KeyValue,
};

/// Arguments for the calibrate command.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Basket file (TOML)
    pub file: PathBuf,

    /// Optimizer, overriding the basket file
    #[arg(short, long, value_enum)]
    pub method: Option<MethodChoice>,

    /// Iteration budget, overriding the basket file
    #[arg(long)]
    pub max_iterations: Option<u32>,

    #[command(flatten)]
    pub grid: GridArgs,
}

/// Optimizer choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodChoice {
    /// Projected BFGS with box constraints
    #[value(name = "bfgs", alias = "l-bfgs-b")]
    Bfgs,
    /// Levenberg-Marquardt
    #[value(name = "lm", alias = "levenberg-marquardt")]
    Lm,
}

impl From<MethodChoice> for OptimizerMethod {
    fn from(choice: MethodChoice) -> Self {
        match choice {
            MethodChoice::Bfgs => OptimizerMethod::BoundedBfgs,
            MethodChoice::Lm => OptimizerMethod::LevenbergMarquardt,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct PriceFitRow {
    #[tabled(rename = "Instrument")]
    label: String,
    #[tabled(rename = "Maturity")]
    maturity: String,
    #[tabled(rename = "Observed")]
    observed: String,
    #[tabled(rename = "Fitted")]
    fitted: String,
    #[tabled(rename = "Residual")]
    residual: String,
}

impl From<&PriceFit> for PriceFitRow {
    fn from(fit: &PriceFit) -> Self {
        Self {
            label: fit.label.clone(),
            maturity: format!("{:.2}Y", fit.maturity),
            observed: format!("{:.6}", fit.observed),
            fitted: format!("{:.6}", fit.fitted),
            residual: format!("{:+.6}", fit.residual),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct YieldFitRow {
    #[tabled(rename = "Instrument")]
    instrument: String,
    #[tabled(rename = "Maturity")]
    maturity: String,
    #[tabled(rename = "DF (obs)")]
    observed_discount_factor: String,
    #[tabled(rename = "DF (model)")]
    fitted_discount_factor: String,
    #[tabled(rename = "Yield (obs)")]
    observed_yield: String,
    #[tabled(rename = "Yield (model)")]
    fitted_yield: String,
}

impl From<&InstrumentFit<'_>> for YieldFitRow {
    fn from(row: &InstrumentFit<'_>) -> Self {
        Self {
            instrument: row.instrument.to_string(),
            maturity: format!("{:.2}Y", row.fit.maturity),
            observed_discount_factor: format!("{:.6}", row.fit.observed_discount_factor),
            fitted_discount_factor: format!("{:.6}", row.fit.fitted_discount_factor),
            observed_yield: format_percent(row.fit.observed_yield),
            fitted_yield: format_percent(row.fit.fitted_yield),
        }
    }
}

#[derive(Debug, Serialize)]
struct InstrumentFit<'a> {
    instrument: &'a str,
    #[serde(flatten)]
    fit: MaturityFit,
}

#[derive(Debug, Serialize)]
struct CalibrationReport<'a> {
    valuation_date: String,
    method: String,
    result: &'a CalibrationResult,
    maturity_fits: &'a [InstrumentFit<'a>],
    curve: &'a [CurvePoint],
}

/// Execute the calibrate command.
pub fn execute(args: CalibrateArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let file = BasketFile::load(&args.file)?;
    let schedules = file.schedules()?;
    let baskets = file.baskets()?;

    let mut config = file.calibration;
    if let Some(method) = args.method {
        config = config.with_method(method.into());
    }
    if let Some(max_iterations) = args.max_iterations {
        config = config.with_max_iterations(max_iterations);
    }

    let result = Calibrator::new(config).calibrate(&baskets, file.seed)?;
    let curve = evaluate_curve(&result.params, &grid(args.grid)?);
    let maturity_fits: Vec<InstrumentFit<'_>> = file
        .instruments
        .iter()
        .zip(&schedules)
        .map(|(bond, schedule)| InstrumentFit {
            instrument: bond.name(),
            fit: maturity_fit(schedule, &result.params),
        })
        .collect();

    if let Some(message) = &result.message {
        print_warning(message);
    }

    match format {
        OutputFormat::Table => {
            if !quiet {
                print_header("Calibration");
                print_output(
                    &[
                        KeyValue::new("Valuation Date", file.valuation_date.to_string()),
                        KeyValue::new("Method", config.optimizer.method.to_string()),
                        KeyValue::new("Instruments", baskets.len().to_string()),
                        KeyValue::new("Converged", result.converged.to_string()),
                        KeyValue::new("Termination", result.termination.to_string()),
                        KeyValue::new("Iterations", result.iterations.to_string()),
                        KeyValue::new("Evaluations", result.evaluations.to_string()),
                        KeyValue::new("Loss", format!("{:.6e}", result.loss)),
                        KeyValue::new("Gradient Norm", format!("{:.3e}", result.gradient_norm)),
                        KeyValue::from_f64("RMS Error", result.rms_error(), 6),
                    ],
                    format,
                )?;
            }

            print_header("Nelson-Siegel Parameters");
            print_output(&parameter_rows(&result.params), format)?;

            if !quiet {
                print_header("Price Fit");
                let rows: Vec<PriceFitRow> = result.price_fits.iter().map(PriceFitRow::from).collect();
                print_output(&rows, format)?;

                print_header("Yield Fit");
                let rows: Vec<YieldFitRow> = maturity_fits.iter().map(YieldFitRow::from).collect();
                print_output(&rows, format)?;

                print_header("Fitted Curve");
                let rows: Vec<CurveRow> = curve.iter().map(CurveRow::from).collect();
                print_output(&rows, format)?;

                if result.converged {
                    print_success(&result.summary());
                }
            }
        }
        OutputFormat::Json => {
            print_json(&CalibrationReport {
                valuation_date: file.valuation_date.to_string(),
                method: config.optimizer.method.to_string(),
                result: &result,
                maturity_fits: &maturity_fits,
                curve: &curve,
            })?;
        }
        OutputFormat::Csv => print_csv(&curve)?,
    }

    Ok(())
}
