//! Dated cashflow amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Date;

/// A single fixed cashflow paid on a calendar date.
///
/// Time to maturity is not stored; it is derived against a valuation date
/// when a schedule is built.
///
/// # Example
///
/// ```rust
/// use siegel_core::types::{Cashflow, Date};
///
/// let cf = Cashflow::new(Date::from_ymd(2025, 6, 12).unwrap(), 108.0);
/// assert_eq!(cf.amount(), 108.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    /// Payment date
    date: Date,
    /// Amount in currency units
    amount: f64,
}

impl Cashflow {
    /// Creates a new cashflow.
    #[must_use]
    pub fn new(date: Date, amount: f64) -> Self {
        Self { date, amount }
    }

    /// Returns the payment date.
    #[must_use]
    pub fn date(&self) -> Date {
        self.date
    }

    /// Returns the cashflow amount.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl fmt::Display for Cashflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.4}", self.date, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let cf = Cashflow::new(Date::from_ymd(2026, 4, 15).unwrap(), 8.0);
        assert_eq!(cf.to_string(), "2026-04-15: 8.0000");
    }

    #[test]
    fn test_deserialize() {
        let cf: Cashflow =
            serde_json::from_str(r#"{"date":"2027-04-15","amount":108.0}"#).unwrap();
        assert_eq!(cf.date(), Date::from_ymd(2027, 4, 15).unwrap());
        assert_eq!(cf.amount(), 108.0);
    }
}
