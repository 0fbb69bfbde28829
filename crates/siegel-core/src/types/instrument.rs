//! Fixed-cashflow bond definitions.

use serde::{Deserialize, Serialize};

use super::{Cashflow, Date};
use crate::error::{CoreError, CoreResult};

/// A fixed-cashflow bond with a reference yield.
///
/// The reference yield is an annually compounded rate used only to
/// synthesize an observed price when no market quote is available.
/// Instruments are immutable once constructed.
///
/// # Example
///
/// ```rust
/// use siegel_core::types::{Cashflow, Date, Instrument};
///
/// let bond = Instrument::new(
///     "RIKB 25 0612",
///     vec![Cashflow::new(Date::from_ymd(2025, 6, 12).unwrap(), 108.0)],
///     0.0915,
/// )
/// .unwrap();
///
/// assert_eq!(bond.cashflows().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstrumentDef")]
pub struct Instrument {
    name: String,
    cashflows: Vec<Cashflow>,
    reference_yield: f64,
}

impl Instrument {
    /// Creates a new instrument.
    ///
    /// Cashflows are kept in the order given.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInstrument` if the reference yield is not
    /// finite or is at or below -100%, or if a cashflow amount is not finite.
    pub fn new(
        name: impl Into<String>,
        cashflows: Vec<Cashflow>,
        reference_yield: f64,
    ) -> CoreResult<Self> {
        let name = name.into();

        if !reference_yield.is_finite() || reference_yield <= -1.0 {
            return Err(CoreError::invalid_instrument(
                name,
                format!("reference yield must be finite and above -1, got {reference_yield}"),
            ));
        }

        if let Some(cf) = cashflows.iter().find(|cf| !cf.amount().is_finite()) {
            return Err(CoreError::invalid_instrument(
                name,
                format!("non-finite cashflow amount on {}", cf.date()),
            ));
        }

        Ok(Self {
            name,
            cashflows,
            reference_yield,
        })
    }

    /// Builds an instrument from parallel date and amount lists.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInstrument` if the lists differ in length,
    /// plus everything [`Instrument::new`] rejects.
    pub fn from_parts(
        name: impl Into<String>,
        dates: &[Date],
        amounts: &[f64],
        reference_yield: f64,
    ) -> CoreResult<Self> {
        let name = name.into();
        if dates.len() != amounts.len() {
            return Err(CoreError::invalid_instrument(
                name,
                format!("{} dates but {} amounts", dates.len(), amounts.len()),
            ));
        }

        let cashflows = dates
            .iter()
            .zip(amounts)
            .map(|(&date, &amount)| Cashflow::new(date, amount))
            .collect();

        Self::new(name, cashflows, reference_yield)
    }

    /// Returns the instrument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cashflows in payment order.
    #[must_use]
    pub fn cashflows(&self) -> &[Cashflow] {
        &self.cashflows
    }

    /// Returns the reference annual yield.
    #[must_use]
    pub fn reference_yield(&self) -> f64 {
        self.reference_yield
    }

    /// Returns the last payment date, if any.
    #[must_use]
    pub fn maturity_date(&self) -> Option<Date> {
        self.cashflows.iter().map(Cashflow::date).max()
    }
}

#[derive(Deserialize)]
struct InstrumentDef {
    name: String,
    cashflows: Vec<Cashflow>,
    reference_yield: f64,
}

impl TryFrom<InstrumentDef> for Instrument {
    type Error = CoreError;

    fn try_from(def: InstrumentDef) -> Result<Self, Self::Error> {
        Self::new(def.name, def.cashflows, def.reference_yield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_from_parts() {
        let bond = Instrument::from_parts(
            "RIKB 27 0415",
            &[d(2025, 4, 15), d(2026, 4, 15), d(2027, 4, 15)],
            &[8.0, 8.0, 108.0],
            0.0814,
        )
        .unwrap();

        assert_eq!(bond.name(), "RIKB 27 0415");
        assert_eq!(bond.cashflows().len(), 3);
        assert_eq!(bond.maturity_date(), Some(d(2027, 4, 15)));
    }

    #[test]
    fn test_mismatched_parts() {
        let err = Instrument::from_parts("X", &[d(2025, 1, 1)], &[1.0, 2.0], 0.05).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInstrument { .. }));
    }

    #[test]
    fn test_invalid_yield() {
        assert!(Instrument::new("X", vec![], -1.0).is_err());
        assert!(Instrument::new("X", vec![], f64::NAN).is_err());
    }

    #[test]
    fn test_non_finite_amount() {
        let cfs = vec![Cashflow::new(d(2025, 1, 1), f64::INFINITY)];
        assert!(Instrument::new("X", cfs, 0.05).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Instrument = serde_json::from_str(
            r#"{"name":"B","reference_yield":0.05,"cashflows":[{"date":"2030-01-01","amount":105.0}]}"#,
        )
        .unwrap();
        assert_eq!(ok.reference_yield(), 0.05);

        let bad = serde_json::from_str::<Instrument>(
            r#"{"name":"B","reference_yield":-2.0,"cashflows":[]}"#,
        );
        assert!(bad.is_err());
    }
}
