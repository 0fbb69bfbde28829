//! Curve evaluation over maturity grids and rate conversions.

use serde::Serialize;

use crate::error::{CurveError, CurveResult};
use crate::nelson_siegel::{NelsonSiegel, NelsonSiegelParams};
use crate::schedule::CashflowSchedule;

/// The model evaluated at one maturity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Maturity in years.
    pub maturity: f64,
    /// Continuously compounded zero rate.
    pub rate: f64,
    /// Discount factor.
    pub discount_factor: f64,
    /// Annually compounded equivalent, `e^rate - 1`.
    pub annual_rate: f64,
}

/// Evaluates the curve at each maturity, preserving grid order.
#[must_use]
pub fn evaluate_curve(params: &NelsonSiegelParams, grid: &[f64]) -> Vec<CurvePoint> {
    let model = NelsonSiegel::new(*params);
    grid.iter()
        .map(|&maturity| {
            let rate = model.rate(maturity);
            CurvePoint {
                maturity,
                rate,
                discount_factor: (-rate * maturity).exp(),
                annual_rate: continuous_to_annual(rate),
            }
        })
        .collect()
}

/// Observed versus fitted discount factor and yield at an instrument's
/// final payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaturityFit {
    /// Time to the final payment in years.
    pub maturity: f64,
    /// Discount factor at the reference yield.
    pub observed_discount_factor: f64,
    /// Model discount factor.
    pub fitted_discount_factor: f64,
    /// Reference yield, annually compounded.
    pub observed_yield: f64,
    /// Model zero rate, annually compounded.
    pub fitted_yield: f64,
}

impl MaturityFit {
    /// `fitted_yield - observed_yield`.
    #[must_use]
    pub fn yield_error(&self) -> f64 {
        self.fitted_yield - self.observed_yield
    }
}

/// Compares the curve with a schedule's reference yield at its last maturity.
#[must_use]
pub fn maturity_fit(schedule: &CashflowSchedule, params: &NelsonSiegelParams) -> MaturityFit {
    let maturity = schedule.last_maturity();
    let fitted_discount_factor = NelsonSiegel::new(*params).discount_factor(maturity);
    MaturityFit {
        maturity,
        observed_discount_factor: schedule.reference_discount_factor(),
        fitted_discount_factor,
        observed_yield: schedule.reference_yield(),
        fitted_yield: yield_from_discount_factor(fitted_discount_factor, maturity),
    }
}

/// Converts a continuously compounded rate to annual compounding.
#[must_use]
pub fn continuous_to_annual(rate: f64) -> f64 {
    rate.exp_m1()
}

/// Converts an annually compounded rate to continuous compounding.
#[must_use]
pub fn annual_to_continuous(annual_rate: f64) -> f64 {
    annual_rate.ln_1p()
}

/// Annually compounded yield implied by a discount factor:
/// `(1/df)^(1/τ) - 1`.
#[must_use]
pub fn yield_from_discount_factor(discount_factor: f64, maturity: f64) -> f64 {
    (1.0 / discount_factor).powf(1.0 / maturity) - 1.0
}

/// `points` evenly spaced values from `start` to `end` inclusive.
///
/// # Errors
///
/// `InvalidGrid` if `points < 2` or either end is not finite.
pub fn linspace(start: f64, end: f64, points: usize) -> CurveResult<Vec<f64>> {
    if points < 2 {
        return Err(CurveError::invalid_grid(format!(
            "need at least 2 points, got {points}"
        )));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(CurveError::invalid_grid(format!(
            "grid ends must be finite, got [{start}, {end}]"
        )));
    }

    let step = (end - start) / (points - 1) as f64;
    let mut grid: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
    grid[points - 1] = end;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_evaluate_curve_preserves_order() {
        let params = NelsonSiegelParams::new(0.06, -0.02, 0.01, 1.5).unwrap();
        let grid = [10.0, 0.0, 2.5];
        let points = evaluate_curve(&params, &grid);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].maturity, 10.0);
        assert_eq!(points[1].discount_factor, 1.0);
        assert_relative_eq!(points[1].rate, 0.04, epsilon = 1e-15);

        let model = NelsonSiegel::new(params);
        assert_relative_eq!(points[2].discount_factor, model.discount_factor(2.5));
        assert_relative_eq!(points[2].annual_rate, model.rate(2.5).exp() - 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_yield_from_discount_factor_agrees_with_annual_rate() {
        let params = NelsonSiegelParams::HISTORICAL_SEED;
        for point in evaluate_curve(&params, &linspace(0.1, 20.0, 50).unwrap()) {
            assert_relative_eq!(
                yield_from_discount_factor(point.discount_factor, point.maturity),
                point.annual_rate,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_maturity_fit() {
        use crate::schedule::build_schedule;
        use siegel_core::daycounts::ActualFixed;
        use siegel_core::types::{Cashflow, Date};

        let today = Date::from_ymd(2025, 1, 1).unwrap();
        let cashflows = [
            Cashflow::new(Date::from_ymd(2026, 1, 1).unwrap(), 5.0),
            Cashflow::new(Date::from_ymd(2027, 1, 1).unwrap(), 105.0),
        ];
        let schedule =
            build_schedule(today, &cashflows, 0.05, &ActualFixed::ACT_365_FIXED).unwrap();

        // Flat 5% annual curve: θ0 = ln(1.05), no slope or curvature.
        let flat = NelsonSiegelParams::new(0.05_f64.ln_1p(), 0.0, 0.0, 1.0).unwrap();
        let fit = maturity_fit(&schedule, &flat);

        assert_relative_eq!(fit.maturity, 2.0);
        assert_relative_eq!(fit.observed_discount_factor, 1.05_f64.powi(-2), epsilon = 1e-14);
        assert_relative_eq!(
            fit.fitted_discount_factor,
            fit.observed_discount_factor,
            epsilon = 1e-14
        );
        assert_eq!(fit.observed_yield, 0.05);
        assert!(fit.yield_error().abs() < 1e-12);

        let steeper = NelsonSiegelParams::new(0.07, 0.0, 0.0, 1.0).unwrap();
        let fit = maturity_fit(&schedule, &steeper);
        assert!(fit.fitted_discount_factor < fit.observed_discount_factor);
        assert!(fit.yield_error() > 0.0);
    }

    #[test]
    fn test_linspace() {
        let grid = linspace(0.1, 20.0, 1000).unwrap();
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], 0.1);
        assert_eq!(grid[999], 20.0);
        assert_relative_eq!(grid[1] - grid[0], 19.9 / 999.0, epsilon = 1e-12);

        assert!(matches!(linspace(0.0, 1.0, 1), Err(CurveError::InvalidGrid { .. })));
        assert!(linspace(0.0, f64::NAN, 10).is_err());
    }

    proptest! {
        #[test]
        fn prop_annual_rate_inverts(rate in -0.5f64..0.5) {
            let annual = continuous_to_annual(rate);
            prop_assert!((annual_to_continuous(annual) - rate).abs() < 1e-15);
            prop_assert!(((1.0 + annual).ln() - rate).abs() < 1e-12);
        }
    }
}
