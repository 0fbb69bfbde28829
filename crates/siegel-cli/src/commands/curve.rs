//! Curve command implementation.
//!
//! Evaluates a Nelson-Siegel curve for parameters given on the command line.

use anyhow::Result;
use clap::Args;

use siegel_curves::evaluation::{evaluate_curve, CurvePoint};
use siegel_curves::NelsonSiegelParams;

use crate::cli::{GridArgs, OutputFormat};
use crate::commands::{grid, CurveRow};
use crate::output::{print_csv, print_header, print_json, print_output, KeyValue};

/// Arguments for the curve command.
#[derive(Args, Debug)]
pub struct CurveArgs {
    /// Long-run level θ0 (decimal, e.g. 0.06)
    #[arg(long, allow_hyphen_values = true)]
    pub theta0: f64,

    /// Slope weight θ1
    #[arg(long, allow_hyphen_values = true)]
    pub theta1: f64,

    /// Curvature weight θ2
    #[arg(long, allow_hyphen_values = true)]
    pub theta2: f64,

    /// Decay scale λ in years (must be positive)
    #[arg(long)]
    pub lambda: f64,

    #[command(flatten)]
    pub grid: GridArgs,
}

/// Execute the curve command.
pub fn execute(args: CurveArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let params = NelsonSiegelParams::new(args.theta0, args.theta1, args.theta2, args.lambda)?;
    let points = evaluate_curve(&params, &grid(args.grid)?);

    print_curve(&params, &points, format, quiet)
}

/// Prints a curve with its parameters.
pub fn print_curve(
    params: &NelsonSiegelParams,
    points: &[CurvePoint],
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if !quiet {
                print_header("Nelson-Siegel Parameters");
                print_output(&parameter_rows(params), format)?;
                print_header("Curve");
            }
            let rows: Vec<CurveRow> = points.iter().map(CurveRow::from).collect();
            print_output(&rows, format)?;
        }
        OutputFormat::Json => print_json(points)?,
        OutputFormat::Csv => print_csv(points)?,
    }
    Ok(())
}

/// Parameter listing for table output.
pub fn parameter_rows(params: &NelsonSiegelParams) -> Vec<KeyValue> {
    vec![
        KeyValue::from_f64("θ0", params.theta0(), 6),
        KeyValue::from_f64("θ1", params.theta1(), 6),
        KeyValue::from_f64("θ2", params.theta2(), 6),
        KeyValue::from_f64("λ", params.lambda(), 6),
    ]
}
