//! Error types for curve operations.
//!
//! Validation failures are raised before any optimization starts. Running
//! out of iterations is not an error; see
//! [`CalibrationResult`](crate::calibration::CalibrationResult).

use siegel_core::CoreError;
use siegel_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// A maturity or date span runs backwards.
    #[error("Invalid date order: {reason}")]
    InvalidDateOrder {
        /// Description of the offending span.
        reason: String,
    },

    /// The decay parameter must be strictly positive.
    #[error("Lambda must be positive, got {lambda}")]
    NonPositiveLambda {
        /// The rejected value.
        lambda: f64,
    },

    /// An instrument or basket has no cashflows.
    #[error("No cashflows for '{instrument}'")]
    EmptyCashflowList {
        /// Instrument or basket label.
        instrument: String,
    },

    /// Cashflow and maturity sequences are empty or differ in length.
    #[error("Shape mismatch: {cashflows} cashflows vs {maturities} maturities")]
    ShapeMismatch {
        /// Number of cashflow amounts.
        cashflows: usize,
        /// Number of maturities.
        maturities: usize,
    },

    /// A cashflow falls on or before the valuation date.
    #[error("Degenerate maturity {maturity:.6} for '{instrument}' (cashflow {index})")]
    DegenerateMaturity {
        /// Instrument or basket label.
        instrument: String,
        /// Position of the cashflow.
        index: usize,
        /// The offending maturity in years.
        maturity: f64,
    },

    /// The objective is NaN or infinite at the starting point.
    #[error("Optimizer diverged: loss is {value} at the starting point")]
    OptimizerDivergence {
        /// The non-finite loss.
        value: f64,
    },

    /// Calibration was given no instruments.
    #[error("No instruments to calibrate against")]
    NoInstruments,

    /// An instrument or basket holds non-finite data.
    #[error("Invalid instrument '{name}': {reason}")]
    InvalidInstrument {
        /// Instrument or basket label.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// A parameter bound is empty or malformed.
    #[error("Invalid bounds for {parameter}: [{lower}, {upper}]")]
    InvalidBounds {
        /// Parameter name.
        parameter: String,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// A maturity grid cannot be built.
    #[error("Invalid maturity grid: {reason}")]
    InvalidGrid {
        /// Description of the problem.
        reason: String,
    },

    /// Error from the core types.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Error from the optimizer.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl CurveError {
    /// Creates an invalid date order error.
    #[must_use]
    pub fn invalid_date_order(reason: impl Into<String>) -> Self {
        Self::InvalidDateOrder {
            reason: reason.into(),
        }
    }

    /// Creates an empty cashflow list error.
    #[must_use]
    pub fn empty_cashflows(instrument: impl Into<String>) -> Self {
        Self::EmptyCashflowList {
            instrument: instrument.into(),
        }
    }

    /// Creates a shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(cashflows: usize, maturities: usize) -> Self {
        Self::ShapeMismatch {
            cashflows,
            maturities,
        }
    }

    /// Creates a degenerate maturity error.
    #[must_use]
    pub fn degenerate_maturity(instrument: impl Into<String>, index: usize, maturity: f64) -> Self {
        Self::DegenerateMaturity {
            instrument: instrument.into(),
            index,
            maturity,
        }
    }

    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid bounds error.
    #[must_use]
    pub fn invalid_bounds(parameter: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self::InvalidBounds {
            parameter: parameter.into(),
            lower,
            upper,
        }
    }

    /// Creates an invalid grid error.
    #[must_use]
    pub fn invalid_grid(reason: impl Into<String>) -> Self {
        Self::InvalidGrid {
            reason: reason.into(),
        }
    }
}
