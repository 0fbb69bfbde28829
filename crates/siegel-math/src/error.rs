//! Error types for mathematical operations.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during optimization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Vector lengths disagree.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A box constraint is empty or malformed.
    #[error("Invalid bounds for parameter {index}: [{lower}, {upper}]")]
    InvalidBounds {
        /// Parameter index.
        index: usize,
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// The objective is NaN or infinite at the starting point.
    #[error("Objective is not finite at the starting point (value: {value})")]
    NonFiniteObjective {
        /// The offending objective value.
        value: f64,
    },
}

impl MathError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a non-finite objective error.
    #[must_use]
    pub fn non_finite_objective(value: f64) -> Self {
        Self::NonFiniteObjective { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::dimension_mismatch(4, 3);
        assert!(err.to_string().contains("expected 4, got 3"));

        let err = MathError::non_finite_objective(f64::NAN);
        assert!(err.to_string().contains("NaN"));
    }
}
