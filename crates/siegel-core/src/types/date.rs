//! Calendar dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A calendar date, serialized as `YYYY-MM-DD`.
///
/// # Example
///
/// ```rust
/// use siegel_core::types::Date;
///
/// let valuation = Date::parse("2024-09-12").unwrap();
/// let payment = Date::from_ymd(2025, 6, 12).unwrap();
/// assert_eq!(valuation.days_between(&payment), 273);
/// assert_eq!(valuation.add_days(273), payment);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date from year, month and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` for a day that does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Parses an ISO 8601 date (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> CoreResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Shifts the date by a number of calendar days.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Shifts the date by whole years, keeping month and day.
    ///
    /// February 29 becomes February 28 in a non-leap target year.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is out of range.
    pub fn add_years(&self, years: i32) -> CoreResult<Self> {
        let year = self.0.year() + years;
        let (month, day) = (self.0.month(), self.0.day());
        NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, month, day - 1))
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{self} plus {years} years")))
    }

    /// Calendar days from `self` to `other`, negative when `other` is earlier.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date() {
        assert!(Date::from_ymd(2025, 2, 30).is_err());
        assert!(Date::from_ymd(2025, 13, 1).is_err());
        assert!(Date::from_ymd(2024, 2, 29).is_ok());
    }

    #[test]
    fn test_days_between() {
        let d1 = Date::from_ymd(2024, 9, 12).unwrap();
        let d2 = Date::from_ymd(2025, 6, 12).unwrap();
        assert_eq!(d1.days_between(&d2), 273);
        assert_eq!(d2.days_between(&d1), -273);
        assert_eq!(d1.days_between(&d1), 0);
    }

    #[test]
    fn test_add_days_crosses_leap_day() {
        let date = Date::from_ymd(2028, 2, 28).unwrap();
        assert_eq!(date.add_days(1), Date::from_ymd(2028, 2, 29).unwrap());
        assert_eq!(date.add_days(2), Date::from_ymd(2028, 3, 1).unwrap());
        assert_eq!(date.add_days(-59), Date::from_ymd(2027, 12, 31).unwrap());
    }

    #[test]
    fn test_add_years_rolls_leap_day() {
        let leap = Date::from_ymd(2024, 2, 29).unwrap();
        assert_eq!(leap.add_years(1).unwrap(), Date::from_ymd(2025, 2, 28).unwrap());
        assert_eq!(leap.add_years(4).unwrap(), Date::from_ymd(2028, 2, 29).unwrap());
        assert_eq!(leap.add_years(-4).unwrap(), Date::from_ymd(2020, 2, 29).unwrap());

        let coupon = Date::from_ymd(2025, 2, 17).unwrap();
        assert_eq!(coupon.add_years(17).unwrap(), Date::from_ymd(2042, 2, 17).unwrap());
        assert!(coupon.add_years(i32::MAX / 2).is_err());
    }

    #[test]
    fn test_parse() {
        let date = Date::parse("2031-01-24").unwrap();
        assert_eq!(date, Date::from_ymd(2031, 1, 24).unwrap());
        assert_eq!("2031-01-24".parse::<Date>().unwrap(), date);
        assert!(Date::parse("24/01/2031").is_err());
    }

    #[test]
    fn test_display() {
        let date = Date::from_ymd(2025, 6, 12).unwrap();
        assert_eq!(date.to_string(), "2025-06-12");
    }

    #[test]
    fn test_serde() {
        let date = Date::from_ymd(2025, 6, 15).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2025-06-15\"");
        let parsed: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(date, parsed);
    }
}
