//! Error types for core data handling.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing dates, day counts and instruments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date construction or parsing.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// End date precedes start date where a non-negative span is required.
    #[error("Invalid date order: end {end} is before start {start}")]
    InvalidDateOrder {
        /// Start of the span.
        start: String,
        /// End of the span.
        end: String,
    },

    /// Day count year length is not a positive finite number.
    #[error("Invalid day count: {reason}")]
    InvalidDayCount {
        /// Description of the problem.
        reason: String,
    },

    /// Instrument definition is malformed.
    #[error("Invalid instrument '{name}': {reason}")]
    InvalidInstrument {
        /// Instrument name.
        name: String,
        /// Description of the problem.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid date order error.
    #[must_use]
    pub fn invalid_date_order(start: impl ToString, end: impl ToString) -> Self {
        Self::InvalidDateOrder {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Creates an invalid day count error.
    #[must_use]
    pub fn invalid_day_count(reason: impl Into<String>) -> Self {
        Self::InvalidDayCount {
            reason: reason.into(),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date_order("2025-01-02", "2025-01-01");
        let msg = err.to_string();
        assert!(msg.contains("before start 2025-01-02"));

        let err = CoreError::invalid_instrument("RIKB 25 0612", "no cashflows");
        assert!(err.to_string().contains("RIKB 25 0612"));
    }
}
