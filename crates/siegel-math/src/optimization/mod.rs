//! Optimization algorithms.
//!
//! This module minimizes sums of squared residuals subject to box
//! constraints, for curve fitting and similar calibration problems.
//!
//! # Methods
//!
//! - [`OptimizerMethod::BoundedBfgs`]: projected BFGS quasi-Newton with an
//!   Armijo backtracking line search. Variables sitting on a bound that the
//!   gradient pushes against are frozen for the step.
//! - [`OptimizerMethod::LevenbergMarquardt`]: damped Gauss-Newton with
//!   Marquardt diagonal scaling; trial steps are projected into the box.
//!
//! # Termination
//!
//! Reaching an iteration or evaluation budget, or a failed line search, is
//! reported through [`TerminationReason`] with `converged = false`. Only a
//! non-finite objective at the start point is an error.
//!
//! # Example
//!
//! ```rust
//! use siegel_math::optimization::{minimize, Bounds, LeastSquaresProblem, OptimizationConfig};
//!
//! struct Target;
//!
//! impl LeastSquaresProblem for Target {
//!     fn dimension(&self) -> usize { 2 }
//!     fn num_residuals(&self) -> usize { 2 }
//!     fn residuals(&self, x: &[f64]) -> Vec<f64> {
//!         vec![x[0] - 2.0, x[1] - 3.0]
//!     }
//! }
//!
//! let bounds = Bounds::new(vec![f64::NEG_INFINITY, 0.0], vec![f64::INFINITY, 1.0]).unwrap();
//! let result = minimize(&Target, &[0.0, 0.0], &bounds, &OptimizationConfig::default()).unwrap();
//!
//! assert!(result.converged);
//! assert!((result.parameters[0] - 2.0).abs() < 1e-6);
//! assert_eq!(result.parameters[1], 1.0);
//! ```

mod bfgs;
mod bounds;
mod levenberg_marquardt;
mod problem;

pub use bounds::Bounds;
pub use problem::{finite_difference_jacobian, LeastSquaresProblem, DEFAULT_JACOBIAN_STEP};

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MathError, MathResult};

/// Which minimizer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerMethod {
    /// Projected BFGS (bounded quasi-Newton).
    #[default]
    #[serde(alias = "l-bfgs-b", alias = "bfgs")]
    BoundedBfgs,
    /// Levenberg-Marquardt with box projection.
    #[serde(alias = "lm")]
    LevenbergMarquardt,
}

impl fmt::Display for OptimizerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerMethod::BoundedBfgs => "bounded-bfgs",
            OptimizerMethod::LevenbergMarquardt => "levenberg-marquardt",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OptimizerMethod {
    type Err = MathError;

    /// Parses a method name, ignoring case.
    ///
    /// Accepts `bounded-bfgs`, `bfgs`, `l-bfgs-b`, `levenberg-marquardt`
    /// and `lm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "bounded-bfgs" | "bfgs" | "l-bfgs-b" | "lbfgsb" => Ok(Self::BoundedBfgs),
            "levenberg-marquardt" | "lm" => Ok(Self::LevenbergMarquardt),
            _ => Err(MathError::invalid_input(format!(
                "unknown optimizer method '{s}'"
            ))),
        }
    }
}

/// Configuration for optimization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Minimizer to run.
    pub method: OptimizerMethod,
    /// Relative objective reduction below which a step counts as converged:
    /// `(f_k - f_{k+1}) / max(|f_k|, |f_{k+1}|, 1) <= tolerance`.
    pub tolerance: f64,
    /// Infinity-norm threshold on the projected gradient.
    pub gradient_tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
    /// Maximum number of objective evaluations.
    pub max_evaluations: u32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            method: OptimizerMethod::BoundedBfgs,
            tolerance: 1e7 * f64::EPSILON,
            gradient_tolerance: 1e-5,
            max_iterations: 15_000,
            max_evaluations: 15_000,
        }
    }
}

impl OptimizationConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: OptimizerMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the relative objective tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the projected gradient tolerance.
    #[must_use]
    pub fn with_gradient_tolerance(mut self, gradient_tolerance: f64) -> Self {
        self.gradient_tolerance = gradient_tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the maximum objective evaluations.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: u32) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Checks that tolerances are non-negative and finite and budgets are
    /// non-zero.
    pub fn validate(&self) -> MathResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MathError::invalid_input(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.gradient_tolerance.is_finite() || self.gradient_tolerance < 0.0 {
            return Err(MathError::invalid_input(format!(
                "gradient tolerance must be finite and non-negative, got {}",
                self.gradient_tolerance
            )));
        }
        if self.max_iterations == 0 || self.max_evaluations == 0 {
            return Err(MathError::invalid_input(
                "iteration and evaluation budgets must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Why an optimizer run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationReason {
    /// Projected gradient fell below `gradient_tolerance`.
    GradientTolerance,
    /// Relative objective reduction fell below `tolerance`.
    FunctionTolerance,
    /// No representable step improves the objective.
    StepTolerance,
    /// Iteration budget exhausted.
    MaxIterations,
    /// Evaluation budget exhausted.
    MaxEvaluations,
    /// No acceptable step found along the search direction.
    LineSearchFailed,
}

impl TerminationReason {
    /// Returns true for the reasons that count as convergence.
    #[must_use]
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Self::GradientTolerance | Self::FunctionTolerance | Self::StepTolerance
        )
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::GradientTolerance => "projected gradient below tolerance",
            Self::FunctionTolerance => "relative reduction of objective below tolerance",
            Self::StepTolerance => "step size below machine precision",
            Self::MaxIterations => "iteration limit reached",
            Self::MaxEvaluations => "evaluation limit reached",
            Self::LineSearchFailed => "line search failed to find a decreasing step",
        };
        write!(f, "{text}")
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub parameters: Vec<f64>,
    /// Objective value at `parameters`.
    pub objective_value: f64,
    /// Infinity norm of the projected gradient at `parameters`.
    pub gradient_norm: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Number of objective evaluations used.
    pub evaluations: u32,
    /// Why the run stopped.
    pub termination: TerminationReason,
    /// Whether the optimization converged.
    pub converged: bool,
}

impl OptimizationResult {
    pub(crate) fn new(
        parameters: &DVector<f64>,
        objective_value: f64,
        gradient_norm: f64,
        iterations: u32,
        evaluations: u32,
        termination: TerminationReason,
    ) -> Self {
        Self {
            parameters: parameters.as_slice().to_vec(),
            objective_value,
            gradient_norm,
            iterations,
            evaluations,
            termination,
            converged: termination.is_converged(),
        }
    }
}

/// Minimizes `Σ r_i(x)²` over the box `bounds`, starting from `initial`.
///
/// A starting point outside the box is projected into it first.
///
/// # Errors
///
/// - `InvalidInput` for an invalid configuration or a non-finite start.
/// - `DimensionMismatch` if `initial`, `bounds` and the problem disagree.
/// - `NonFiniteObjective` if the objective is NaN or infinite at the start.
pub fn minimize<P>(
    problem: &P,
    initial: &[f64],
    bounds: &Bounds,
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult>
where
    P: LeastSquaresProblem + ?Sized,
{
    config.validate()?;

    let n = problem.dimension();
    if initial.len() != n {
        return Err(MathError::dimension_mismatch(n, initial.len()));
    }
    if bounds.dimension() != n {
        return Err(MathError::dimension_mismatch(n, bounds.dimension()));
    }
    if initial.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("initial point must be finite"));
    }

    let mut start = initial.to_vec();
    bounds.project(&mut start);
    let start = DVector::from_vec(start);

    let result = match config.method {
        OptimizerMethod::BoundedBfgs => bfgs::minimize(problem, start, bounds, config)?,
        OptimizerMethod::LevenbergMarquardt => {
            levenberg_marquardt::minimize(problem, start, bounds, config)?
        }
    };

    tracing::debug!(
        method = %config.method,
        objective = result.objective_value,
        iterations = result.iterations,
        evaluations = result.evaluations,
        termination = %result.termination,
        "optimizer finished"
    );

    Ok(result)
}
