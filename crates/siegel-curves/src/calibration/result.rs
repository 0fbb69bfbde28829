//! Calibration output.

use serde::Serialize;
use siegel_math::optimization::TerminationReason;

use crate::nelson_siegel::{NelsonSiegel, NelsonSiegelParams};

/// Fitted versus observed price of one basket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceFit {
    /// Basket label.
    pub label: String,
    /// Longest maturity in the basket, in years.
    pub maturity: f64,
    /// Observed price.
    pub observed: f64,
    /// Model price at the fitted parameters.
    pub fitted: f64,
    /// `fitted - observed`.
    pub residual: f64,
}

/// Result of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationResult {
    /// Best parameters found.
    pub params: NelsonSiegelParams,
    /// Sum of squared price errors at `params`.
    pub loss: f64,
    /// Infinity norm of the projected loss gradient at `params`.
    pub gradient_norm: f64,
    /// Whether the optimizer met a convergence criterion.
    pub converged: bool,
    /// Diagnostic message when the run did not converge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optimizer iterations used.
    pub iterations: u32,
    /// Loss evaluations used.
    pub evaluations: u32,
    /// Why the optimizer stopped.
    pub termination: TerminationReason,
    /// Per-basket fit, in input order.
    pub price_fits: Vec<PriceFit>,
}

impl CalibrationResult {
    /// Returns the fitted model.
    #[must_use]
    pub fn model(&self) -> NelsonSiegel {
        NelsonSiegel::new(self.params)
    }

    /// Returns the price residuals in basket order.
    #[must_use]
    pub fn residuals(&self) -> Vec<f64> {
        self.price_fits.iter().map(|fit| fit.residual).collect()
    }

    /// Root mean square of the price residuals.
    #[must_use]
    pub fn rms_error(&self) -> f64 {
        if self.price_fits.is_empty() {
            return 0.0;
        }
        (self.loss / self.price_fits.len() as f64).sqrt()
    }

    /// Returns the maximum absolute price residual.
    #[must_use]
    pub fn max_error(&self) -> f64 {
        self.price_fits
            .iter()
            .map(|fit| fit.residual.abs())
            .fold(0.0, f64::max)
    }

    /// One-line summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "Calibration {}: {} iterations, loss={:.6e}, RMS={:.6}, Max={:.6} ({})",
            if self.converged { "converged" } else { "FAILED" },
            self.iterations,
            self.loss,
            self.rms_error(),
            self.max_error(),
            self.termination
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fit(residual: f64) -> PriceFit {
        PriceFit {
            label: "x".to_string(),
            maturity: 1.0,
            observed: 100.0,
            fitted: 100.0 + residual,
            residual,
        }
    }

    #[test]
    fn test_error_statistics() {
        let result = CalibrationResult {
            params: NelsonSiegelParams::HISTORICAL_SEED,
            loss: 0.25,
            gradient_norm: 0.1,
            converged: false,
            message: Some("iteration limit reached".to_string()),
            iterations: 7,
            evaluations: 12,
            termination: TerminationReason::MaxIterations,
            price_fits: vec![fit(0.3), fit(-0.4)],
        };

        assert_eq!(result.residuals(), vec![0.3, -0.4]);
        assert_relative_eq!(result.rms_error(), (0.125_f64).sqrt());
        assert_relative_eq!(result.max_error(), 0.4);

        let summary = result.summary();
        assert!(summary.contains("FAILED"));
        assert!(summary.contains("7 iterations"));
    }
}
