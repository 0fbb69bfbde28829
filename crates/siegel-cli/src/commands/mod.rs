//! CLI command implementations.

pub mod calibrate;
pub mod curve;
pub mod schedule;

pub use calibrate::CalibrateArgs;
pub use curve::CurveArgs;
pub use schedule::ScheduleArgs;

use serde::Serialize;
use siegel_curves::evaluation::{linspace, CurvePoint};
use tabled::Tabled;

use crate::cli::GridArgs;
use crate::error::CliResult;

/// Builds the maturity grid from command-line options.
pub fn grid(args: GridArgs) -> CliResult<Vec<f64>> {
    Ok(linspace(args.start, args.end, args.points)?)
}

/// One row of a printed curve.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CurveRow {
    #[tabled(rename = "Maturity")]
    pub maturity: String,
    #[tabled(rename = "Zero (cont.)")]
    pub rate: String,
    #[tabled(rename = "Zero (annual)")]
    pub annual_rate: String,
    #[tabled(rename = "DF")]
    pub discount_factor: String,
}

impl From<&CurvePoint> for CurveRow {
    fn from(point: &CurvePoint) -> Self {
        Self {
            maturity: format!("{:.2}Y", point.maturity),
            rate: crate::output::format_percent(point.rate),
            annual_rate: crate::output::format_percent(point.annual_rate),
            discount_factor: format!("{:.6}", point.discount_factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid() {
        let points = grid(GridArgs {
            start: 1.0,
            end: 5.0,
            points: 5,
        })
        .unwrap();
        assert_eq!(points, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        assert!(grid(GridArgs {
            start: 1.0,
            end: 5.0,
            points: 1,
        })
        .is_err());
    }
}
