//! TOML basket files.
//!
//! ```toml
//! valuation_date = "2024-09-12"
//! days_per_year = 365.25
//!
//! [seed]
//! theta0 = 0.05
//! theta1 = -0.04
//! theta2 = 0.03
//! lambda = 0.2
//!
//! [calibration]
//! method = "l-bfgs-b"
//!
//! [[instruments]]
//! name = "RIKB 25 0612"
//! reference_yield = 0.0915
//! cashflows = [{ date = "2025-06-12", amount = 108.0 }]
//! ```
//!
//! Only `valuation_date` and `instruments` are required.

use std::path::Path;

use serde::Deserialize;
use siegel_core::daycounts::ActualFixed;
use siegel_core::types::{Date, Instrument};
use siegel_curves::calibration::{CalibrationConfig, PricingBasket};
use siegel_curves::{CashflowSchedule, NelsonSiegelParams};

use crate::error::{CliError, CliResult};

fn historical_seed() -> NelsonSiegelParams {
    NelsonSiegelParams::HISTORICAL_SEED
}

/// Contents of a basket file.
#[derive(Debug, Clone, Deserialize)]
pub struct BasketFile {
    /// Date cashflow times are measured from.
    pub valuation_date: Date,
    /// Year length for the ACT/fixed day count.
    #[serde(default, rename = "days_per_year")]
    pub day_count: ActualFixed,
    /// Calibration starting point.
    #[serde(default = "historical_seed")]
    pub seed: NelsonSiegelParams,
    /// Optimizer settings and parameter bounds.
    #[serde(default)]
    pub calibration: CalibrationConfig,
    /// Bonds to calibrate against.
    pub instruments: Vec<Instrument>,
}

impl BasketFile {
    /// Reads and parses a basket file.
    pub fn load(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content).map_err(|source| CliError::InvalidBasketFile {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses basket file contents.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let file: Self = toml::from_str(content)?;
        tracing::debug!(
            instruments = file.instruments.len(),
            valuation_date = %file.valuation_date,
            "loaded basket file"
        );
        Ok(file)
    }

    /// Builds each instrument's schedule at its reference yield.
    pub fn schedules(&self) -> CliResult<Vec<CashflowSchedule>> {
        self.instruments
            .iter()
            .map(|bond| {
                CashflowSchedule::for_instrument(self.valuation_date, bond, &self.day_count)
                    .map_err(CliError::from)
            })
            .collect()
    }

    /// Builds one calibration basket per instrument.
    pub fn baskets(&self) -> CliResult<Vec<PricingBasket>> {
        Ok(self
            .schedules()?
            .iter()
            .zip(&self.instruments)
            .map(|(schedule, bond)| schedule.to_basket(bond.name()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siegel_curves::prelude::OptimizerMethod;

    const MINIMAL: &str = r#"
valuation_date = "2024-09-12"

[[instruments]]
name = "RIKB 25 0612"
reference_yield = 0.0915
cashflows = [{ date = "2025-06-12", amount = 108.0 }]
"#;

    #[test]
    fn test_defaults() {
        let file = BasketFile::parse(MINIMAL).unwrap();
        assert_eq!(file.day_count, ActualFixed::default());
        assert_eq!(file.seed, NelsonSiegelParams::HISTORICAL_SEED);
        assert_eq!(file.calibration, CalibrationConfig::default());
        assert_eq!(file.baskets().unwrap().len(), 1);
    }

    #[test]
    fn test_overrides() {
        let content = r#"
valuation_date = "2024-09-12"
days_per_year = 365.0

[seed]
theta0 = 0.06
theta1 = 0.02
theta2 = 0.0
lambda = 1.5

[calibration]
method = "lm"
max_iterations = 50

[calibration.bounds.lambda]
lower = 0.1
upper = 10.0

[[instruments]]
name = "RIKB 25 0612"
reference_yield = 0.0915
cashflows = [{ date = "2025-06-12", amount = 108.0 }]
"#;

        let file = BasketFile::parse(content).unwrap();
        assert_eq!(file.day_count.days_per_year(), 365.0);
        assert_eq!(file.seed.lambda(), 1.5);
        assert_eq!(file.calibration.optimizer.method, OptimizerMethod::LevenbergMarquardt);
        assert_eq!(file.calibration.optimizer.max_iterations, 50);
        assert_eq!(file.calibration.bounds.lambda.upper, Some(10.0));
    }

    #[test]
    fn test_rejects_invalid_instrument() {
        let content = MINIMAL.replace("0.0915", "-2.0");
        assert!(BasketFile::parse(&content).is_err());
    }

    #[test]
    fn test_load_reports_path_and_parser_error() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", MINIMAL.replace("valuation_date", "valuation_day")).unwrap();

        let err = BasketFile::load(file.path()).unwrap_err();
        match &err {
            CliError::InvalidBasketFile { path, source } => {
                assert_eq!(path, &file.path().display().to_string());
                assert!(source.message().contains("valuation_date"), "{source}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let err = BasketFile::load("no-such-basket.toml").unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_rejects_past_cashflow() {
        let content = MINIMAL.replace("2025-06-12", "2024-01-01");
        let file = BasketFile::parse(&content).unwrap();
        assert!(file.schedules().is_err());
    }
}
