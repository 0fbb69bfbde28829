//! Day count conventions.
//!
//! A day count convention turns a span of calendar dates into a fractional
//! number of years. Calibration only needs the actual-days family with a
//! configurable year length:
//!
//! - [`ActualFixed::ACT_365_25`]: average Julian year, the default
//! - [`ActualFixed::ACT_365_FIXED`]: 365-day year
//! - [`ActualFixed::ACT_360`]: money-market 360-day year
//!
//! # Usage
//!
//! ```rust
//! use siegel_core::daycounts::{ActualFixed, DayCount};
//! use siegel_core::types::Date;
//!
//! let dc = ActualFixed::ACT_365_FIXED;
//! let start = Date::from_ymd(2023, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 1, 1).unwrap();
//!
//! assert_eq!(dc.day_count(start, end), 365);
//! assert_eq!(dc.year_fraction(start, end), 1.0);
//! ```

mod actual;

pub use actual::{year_fraction, ActualFixed, DEFAULT_DAYS_PER_YEAR};

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be antisymmetric:
/// `year_fraction(a, b) == -year_fraction(b, a)`.
pub trait DayCount: Send + Sync {
    /// Returns the name of the convention (e.g. "ACT/365.25").
    fn name(&self) -> String;

    /// Returns the number of days between two dates under the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;

    /// Calculates the year fraction between two dates.
    ///
    /// Negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> f64;

    /// Calculates the year fraction, rejecting spans that run backwards.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDateOrder` if `end < start`.
    fn year_fraction_checked(&self, start: Date, end: Date) -> CoreResult<f64> {
        if end < start {
            return Err(CoreError::invalid_date_order(start, end));
        }
        Ok(self.year_fraction(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date_from_offset(days: i64) -> Date {
        Date::from_ymd(2000, 1, 1).unwrap().add_days(days)
    }

    #[test]
    fn test_checked_rejects_reversed_span() {
        let dc = ActualFixed::default();
        let a = Date::from_ymd(2025, 1, 1).unwrap();
        let b = Date::from_ymd(2024, 1, 1).unwrap();

        assert!(matches!(
            dc.year_fraction_checked(a, b),
            Err(CoreError::InvalidDateOrder { .. })
        ));
        assert!(dc.year_fraction_checked(b, a).unwrap() > 0.0);
        assert_eq!(dc.year_fraction_checked(a, a).unwrap(), 0.0);
    }

    #[test]
    fn test_trait_object() {
        let conventions: Vec<Box<dyn DayCount>> = vec![
            Box::new(ActualFixed::ACT_360),
            Box::new(ActualFixed::ACT_365_FIXED),
            Box::new(ActualFixed::ACT_365_25),
        ];
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 7, 1).unwrap();

        let fractions: Vec<f64> = conventions
            .iter()
            .map(|dc| dc.year_fraction(start, end))
            .collect();
        assert!(fractions[0] > fractions[1]);
        assert!(fractions[1] > fractions[2]);
    }

    proptest! {
        #[test]
        fn prop_year_fraction_antisymmetric(a in -20_000i64..20_000, b in -20_000i64..20_000) {
            let (da, db) = (date_from_offset(a), date_from_offset(b));
            for dc in [ActualFixed::ACT_360, ActualFixed::ACT_365_FIXED, ActualFixed::ACT_365_25] {
                prop_assert_eq!(dc.year_fraction(da, db), -dc.year_fraction(db, da));
            }
        }
    }
}
