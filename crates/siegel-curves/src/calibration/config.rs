//! Calibration settings and parameter bounds.

use serde::{Deserialize, Serialize};
use siegel_math::optimization::{Bounds, OptimizationConfig, OptimizerMethod};

use crate::error::{CurveError, CurveResult};
use crate::nelson_siegel::PARAMETER_NAMES;

/// Default lower bound on λ.
pub const DEFAULT_LAMBDA_FLOOR: f64 = 1e-6;

/// Optional lower and upper limit for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRange {
    /// Lower limit; `None` means unbounded below.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    /// Upper limit; `None` means unbounded above.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl ParameterRange {
    /// Creates a range.
    #[must_use]
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    /// No limits.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounded below only.
    #[must_use]
    pub fn at_least(lower: f64) -> Self {
        Self::new(Some(lower), None)
    }

    /// Bounded on both sides.
    #[must_use]
    pub fn between(lower: f64, upper: f64) -> Self {
        Self::new(Some(lower), Some(upper))
    }
}

/// Box constraints on `(θ₀, θ₁, θ₂, λ)`.
///
/// By default θ₀..θ₂ are free and λ is bounded below by
/// [`DEFAULT_LAMBDA_FLOOR`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    /// Range of θ₀.
    pub theta0: ParameterRange,
    /// Range of θ₁.
    pub theta1: ParameterRange,
    /// Range of θ₂.
    pub theta2: ParameterRange,
    /// Range of λ. Both limits, when present, must be positive.
    pub lambda: ParameterRange,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            theta0: ParameterRange::unbounded(),
            theta1: ParameterRange::unbounded(),
            theta2: ParameterRange::unbounded(),
            lambda: ParameterRange::at_least(DEFAULT_LAMBDA_FLOOR),
        }
    }
}

impl ParameterBounds {
    /// Sets the range of θ₀.
    #[must_use]
    pub fn with_theta0(mut self, range: ParameterRange) -> Self {
        self.theta0 = range;
        self
    }

    /// Sets the range of θ₁.
    #[must_use]
    pub fn with_theta1(mut self, range: ParameterRange) -> Self {
        self.theta1 = range;
        self
    }

    /// Sets the range of θ₂.
    #[must_use]
    pub fn with_theta2(mut self, range: ParameterRange) -> Self {
        self.theta2 = range;
        self
    }

    /// Sets the range of λ.
    #[must_use]
    pub fn with_lambda(mut self, range: ParameterRange) -> Self {
        self.lambda = range;
        self
    }

    /// Converts to optimizer bounds.
    ///
    /// # Errors
    ///
    /// - `InvalidBounds` if a limit is NaN or a lower limit exceeds its
    ///   upper limit.
    /// - `NonPositiveLambda` if λ is missing a lower limit, or either λ
    ///   limit is not positive.
    pub fn to_bounds(&self) -> CurveResult<Bounds> {
        let ranges = [self.theta0, self.theta1, self.theta2, self.lambda];
        let mut lower = Vec::with_capacity(ranges.len());
        let mut upper = Vec::with_capacity(ranges.len());

        for (name, range) in PARAMETER_NAMES.iter().zip(ranges) {
            let lo = range.lower.unwrap_or(f64::NEG_INFINITY);
            let hi = range.upper.unwrap_or(f64::INFINITY);
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(CurveError::invalid_bounds(*name, lo, hi));
            }
            lower.push(lo);
            upper.push(hi);
        }

        let lambda_lower = lower[3];
        let lambda_upper = upper[3];
        if lambda_lower <= 0.0 {
            return Err(CurveError::NonPositiveLambda {
                lambda: lambda_lower,
            });
        }
        if lambda_upper <= 0.0 {
            return Err(CurveError::NonPositiveLambda {
                lambda: lambda_upper,
            });
        }

        Ok(Bounds::new(lower, upper)?)
    }
}

/// Configuration for Nelson-Siegel calibration.
///
/// Optimizer settings are flattened, so a TOML table reads
///
/// ```toml
/// method = "l-bfgs-b"
/// max_iterations = 15000
///
/// [bounds.lambda]
/// lower = 0.01
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Optimizer method, tolerances and budgets.
    #[serde(flatten)]
    pub optimizer: OptimizationConfig,
    /// Parameter box.
    pub bounds: ParameterBounds,
}

impl CalibrationConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the optimizer method.
    #[must_use]
    pub fn with_method(mut self, method: OptimizerMethod) -> Self {
        self.optimizer.method = method;
        self
    }

    /// Sets the relative objective tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.optimizer.tolerance = tolerance;
        self
    }

    /// Sets the projected gradient tolerance.
    #[must_use]
    pub fn with_gradient_tolerance(mut self, gradient_tolerance: f64) -> Self {
        self.optimizer.gradient_tolerance = gradient_tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.optimizer.max_iterations = max_iterations;
        self
    }

    /// Sets the maximum objective evaluations.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: u32) -> Self {
        self.optimizer.max_evaluations = max_evaluations;
        self
    }

    /// Sets the parameter bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: ParameterBounds) -> Self {
        self.bounds = bounds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let bounds = ParameterBounds::default().to_bounds().unwrap();
        assert_eq!(bounds.lower()[3], DEFAULT_LAMBDA_FLOOR);
        assert_eq!(bounds.lower()[0], f64::NEG_INFINITY);
        assert!(bounds.upper().iter().all(|u| u.is_infinite()));
    }

    #[test]
    fn test_lambda_must_stay_positive() {
        let open = ParameterBounds::default().with_lambda(ParameterRange::unbounded());
        assert!(matches!(open.to_bounds(), Err(CurveError::NonPositiveLambda { .. })));

        let zero = ParameterBounds::default().with_lambda(ParameterRange::at_least(0.0));
        assert!(matches!(zero.to_bounds(), Err(CurveError::NonPositiveLambda { .. })));

        let capped = ParameterBounds::default().with_lambda(ParameterRange::new(Some(-1.0), Some(-0.5)));
        assert!(matches!(capped.to_bounds(), Err(CurveError::NonPositiveLambda { .. })));
    }

    #[test]
    fn test_inverted_range() {
        let bounds = ParameterBounds::default().with_theta2(ParameterRange::between(0.1, -0.1));
        assert_eq!(
            bounds.to_bounds().unwrap_err(),
            CurveError::InvalidBounds {
                parameter: "theta2".to_string(),
                lower: 0.1,
                upper: -0.1
            }
        );
    }

    #[test]
    fn test_config_from_toml_shape() {
        let config: CalibrationConfig = serde_json::from_str(
            r#"{"method":"lm","max_iterations":200,"bounds":{"lambda":{"lower":0.05,"upper":30.0}}}"#,
        )
        .unwrap();

        assert_eq!(config.optimizer.method, OptimizerMethod::LevenbergMarquardt);
        assert_eq!(config.optimizer.max_iterations, 200);
        assert_eq!(config.bounds.lambda, ParameterRange::between(0.05, 30.0));
        assert_eq!(config.bounds.theta0, ParameterRange::unbounded());
    }
}
