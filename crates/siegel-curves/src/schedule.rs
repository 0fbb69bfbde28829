//! Cashflow schedules discounted at a flat reference yield.
//!
//! A schedule turns an instrument's dated cashflows into year fractions from
//! the valuation date and prices them at the instrument's annually
//! compounded reference yield. The resulting total stands in for an observed
//! dirty price when no market quote is available.

use serde::Serialize;
use siegel_core::daycounts::DayCount;
use siegel_core::types::{Cashflow, Date, Instrument};

use crate::calibration::PricingBasket;
use crate::error::{CurveError, CurveResult};

/// One discounted cashflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleEntry {
    /// Time from the valuation date in years.
    pub maturity: f64,
    /// Cashflow amount.
    pub amount: f64,
    /// `(1 + y)^(-maturity)` at the reference yield `y`.
    pub discount_factor: f64,
    /// `amount × discount_factor`.
    pub present_value: f64,
}

/// A priced cashflow schedule.
///
/// # Example
///
/// ```rust
/// use siegel_core::prelude::*;
/// use siegel_curves::schedule::build_schedule;
///
/// let today = Date::from_ymd(2025, 1, 1).unwrap();
/// let cashflows = [Cashflow::new(Date::from_ymd(2026, 1, 1).unwrap(), 108.0)];
///
/// let schedule = build_schedule(today, &cashflows, 0.0915, &ActualFixed::ACT_365_FIXED).unwrap();
/// assert!((schedule.total_price() - 108.0 / 1.0915).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowSchedule {
    entries: Vec<ScheduleEntry>,
    reference_yield: f64,
    total_price: f64,
}

/// Discounts `cashflows` at `reference_yield` from `valuation_date`.
///
/// # Errors
///
/// - `EmptyCashflowList` if `cashflows` is empty.
/// - `DegenerateMaturity` if a payment falls on or before the valuation
///   date.
/// - `InvalidInstrument` for a non-finite amount or a yield at or below -1.
pub fn build_schedule<D>(
    valuation_date: Date,
    cashflows: &[Cashflow],
    reference_yield: f64,
    day_count: &D,
) -> CurveResult<CashflowSchedule>
where
    D: DayCount + ?Sized,
{
    build_named(
        "cashflow schedule",
        valuation_date,
        cashflows,
        reference_yield,
        day_count,
    )
}

fn build_named<D>(
    name: &str,
    valuation_date: Date,
    cashflows: &[Cashflow],
    reference_yield: f64,
    day_count: &D,
) -> CurveResult<CashflowSchedule>
where
    D: DayCount + ?Sized,
{
    if cashflows.is_empty() {
        return Err(CurveError::empty_cashflows(name));
    }
    if !reference_yield.is_finite() || reference_yield <= -1.0 {
        return Err(CurveError::invalid_instrument(
            name,
            format!("reference yield must be finite and above -1, got {reference_yield}"),
        ));
    }

    let base = 1.0 + reference_yield;
    let mut entries = Vec::with_capacity(cashflows.len());

    for (index, cf) in cashflows.iter().enumerate() {
        let amount = cf.amount();
        if !amount.is_finite() {
            return Err(CurveError::invalid_instrument(
                name,
                format!("cashflow {index} amount is not finite"),
            ));
        }

        let maturity = day_count.year_fraction(valuation_date, cf.date());
        if maturity <= 0.0 {
            return Err(CurveError::degenerate_maturity(name, index, maturity));
        }

        let discount_factor = base.powf(-maturity);
        entries.push(ScheduleEntry {
            maturity,
            amount,
            discount_factor,
            present_value: amount * discount_factor,
        });
    }

    let total_price = entries.iter().map(|e| e.present_value).sum();

    Ok(CashflowSchedule {
        entries,
        reference_yield,
        total_price,
    })
}

impl CashflowSchedule {
    /// Builds the schedule of `instrument` at its own reference yield.
    ///
    /// Errors carry the instrument name.
    pub fn for_instrument<D>(
        valuation_date: Date,
        instrument: &Instrument,
        day_count: &D,
    ) -> CurveResult<Self>
    where
        D: DayCount + ?Sized,
    {
        build_named(
            instrument.name(),
            valuation_date,
            instrument.cashflows(),
            instrument.reference_yield(),
            day_count,
        )
    }

    /// Returns the discounted cashflows in payment order.
    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Returns the number of cashflows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; schedules hold at least one cashflow.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maturities in years.
    #[must_use]
    pub fn maturities(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.maturity).collect()
    }

    /// Returns the cashflow amounts.
    #[must_use]
    pub fn amounts(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.amount).collect()
    }

    /// Returns the longest maturity.
    #[must_use]
    pub fn last_maturity(&self) -> f64 {
        self.entries.iter().map(|e| e.maturity).fold(0.0, f64::max)
    }

    /// Annually compounded yield the schedule is discounted at.
    #[must_use]
    pub fn reference_yield(&self) -> f64 {
        self.reference_yield
    }

    /// Returns the sum of present values.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    /// Discount factor of the final payment at the reference yield.
    #[must_use]
    pub fn reference_discount_factor(&self) -> f64 {
        self.entries
            .iter()
            .max_by(|a, b| a.maturity.total_cmp(&b.maturity))
            .map_or(1.0, |e| e.discount_factor)
    }

    /// Converts the schedule into a calibration basket observed at
    /// [`total_price`](Self::total_price).
    #[must_use]
    pub fn to_basket(&self, label: impl Into<String>) -> PricingBasket {
        PricingBasket::new(self.amounts(), self.maturities(), self.total_price).with_label(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use siegel_core::daycounts::ActualFixed;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_single_cashflow_one_year() {
        let cashflows = [Cashflow::new(d(2026, 1, 1), 108.0)];
        let schedule =
            build_schedule(d(2025, 1, 1), &cashflows, 0.0915, &ActualFixed::ACT_365_FIXED).unwrap();

        assert_eq!(schedule.len(), 1);
        let entry = schedule.entries()[0];
        assert_relative_eq!(entry.maturity, 1.0);
        assert_relative_eq!(entry.discount_factor, 1.0 / 1.0915, epsilon = 1e-14);
        assert_relative_eq!(schedule.total_price(), 108.0 / 1.0915, epsilon = 1e-12);
        assert_relative_eq!(schedule.total_price(), 98.9464, epsilon = 1e-4);
    }

    #[test]
    fn test_coupon_schedule() {
        let bond = Instrument::from_parts(
            "RIKB 27 0415",
            &[d(2025, 4, 15), d(2026, 4, 15), d(2027, 4, 15)],
            &[8.0, 8.0, 108.0],
            0.0814,
        )
        .unwrap();
        let today = d(2024, 9, 12);
        let schedule = CashflowSchedule::for_instrument(today, &bond, &ActualFixed::default()).unwrap();

        let expected: f64 = schedule
            .entries()
            .iter()
            .map(|e| e.amount / 1.0814_f64.powf(e.maturity))
            .sum();
        assert_relative_eq!(schedule.total_price(), expected, epsilon = 1e-12);

        // 2024-09-12 to 2025-04-15 is 215 days.
        assert_relative_eq!(schedule.maturities()[0], 215.0 / 365.25, epsilon = 1e-15);
        assert_eq!(schedule.amounts(), vec![8.0, 8.0, 108.0]);
        assert_relative_eq!(
            schedule.reference_discount_factor(),
            schedule.entries()[2].discount_factor
        );
        assert_eq!(schedule.last_maturity(), schedule.maturities()[2]);
        assert_eq!(schedule.reference_yield(), 0.0814);
    }

    #[test]
    fn test_empty_cashflows() {
        let err = build_schedule(d(2025, 1, 1), &[], 0.05, &ActualFixed::default()).unwrap_err();
        assert!(matches!(err, CurveError::EmptyCashflowList { .. }));
    }

    #[test]
    fn test_cashflow_on_or_before_valuation_date() {
        let today = d(2025, 1, 1);
        for date in [today, d(2024, 6, 1)] {
            let err = build_schedule(today, &[Cashflow::new(date, 100.0)], 0.05, &ActualFixed::default())
                .unwrap_err();
            assert!(matches!(err, CurveError::DegenerateMaturity { index: 0, .. }));
        }
    }

    #[test]
    fn test_errors_name_the_instrument() {
        let bond = Instrument::from_parts("OLD", &[d(2020, 1, 1)], &[100.0], 0.05).unwrap();
        let err = CashflowSchedule::for_instrument(d(2025, 1, 1), &bond, &ActualFixed::default())
            .unwrap_err();
        assert!(err.to_string().contains("OLD"));
    }

    #[test]
    fn test_rejects_bad_yield_and_amount() {
        let today = d(2025, 1, 1);
        let cf = [Cashflow::new(d(2026, 1, 1), 100.0)];
        assert!(matches!(
            build_schedule(today, &cf, -1.0, &ActualFixed::default()),
            Err(CurveError::InvalidInstrument { .. })
        ));

        let cf = [Cashflow::new(d(2026, 1, 1), f64::INFINITY)];
        assert!(matches!(
            build_schedule(today, &cf, 0.05, &ActualFixed::default()),
            Err(CurveError::InvalidInstrument { .. })
        ));
    }

    #[test]
    fn test_to_basket() {
        let cf = [
            Cashflow::new(d(2026, 1, 1), 5.0),
            Cashflow::new(d(2027, 1, 1), 105.0),
        ];
        let schedule = build_schedule(d(2025, 1, 1), &cf, 0.04, &ActualFixed::default()).unwrap();
        let basket = schedule.to_basket("two-year");

        assert_eq!(basket.label(), Some("two-year"));
        assert_eq!(basket.cashflows(), &[5.0, 105.0]);
        assert_eq!(basket.maturities(), schedule.maturities().as_slice());
        assert_eq!(basket.observed_price(), schedule.total_price());
    }
}
