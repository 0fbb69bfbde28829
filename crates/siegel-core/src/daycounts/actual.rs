//! Actual/fixed-year day count.

use serde::{Deserialize, Serialize};

use super::DayCount;
use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// Average number of days in a Julian year.
pub const DEFAULT_DAYS_PER_YEAR: f64 = 365.25;

/// Actual days over a fixed year length.
///
/// # Formula
///
/// $$\text{Year Fraction} = \frac{\text{Actual Days}}{\text{days per year}}$$
///
/// The default year length is 365.25 days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ActualFixed {
    days_per_year: f64,
}

impl ActualFixed {
    /// ACT/365.25.
    pub const ACT_365_25: Self = Self {
        days_per_year: DEFAULT_DAYS_PER_YEAR,
    };

    /// ACT/365 Fixed.
    pub const ACT_365_FIXED: Self = Self {
        days_per_year: 365.0,
    };

    /// ACT/360.
    pub const ACT_360: Self = Self {
        days_per_year: 360.0,
    };

    /// Creates a convention with a custom year length.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDayCount` unless `days_per_year` is finite
    /// and strictly positive.
    pub fn new(days_per_year: f64) -> CoreResult<Self> {
        if !days_per_year.is_finite() || days_per_year <= 0.0 {
            return Err(CoreError::invalid_day_count(format!(
                "days per year must be positive and finite, got {days_per_year}"
            )));
        }
        Ok(Self { days_per_year })
    }

    /// Returns the year length in days.
    #[must_use]
    pub fn days_per_year(&self) -> f64 {
        self.days_per_year
    }
}

impl Default for ActualFixed {
    fn default() -> Self {
        Self::ACT_365_25
    }
}

impl DayCount for ActualFixed {
    fn name(&self) -> String {
        format!("ACT/{}", self.days_per_year)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        self.day_count(start, end) as f64 / self.days_per_year
    }
}

impl TryFrom<f64> for ActualFixed {
    type Error = CoreError;

    fn try_from(days_per_year: f64) -> Result<Self, Self::Error> {
        Self::new(days_per_year)
    }
}

impl From<ActualFixed> for f64 {
    fn from(dc: ActualFixed) -> Self {
        dc.days_per_year
    }
}

/// Year fraction between two dates under ACT/365.25.
#[must_use]
pub fn year_fraction(start: Date, end: Date) -> f64 {
    ActualFixed::default().year_fraction(start, end)
}
