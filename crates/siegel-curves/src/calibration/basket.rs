//! Calibration input baskets.

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::nelson_siegel::NelsonSiegel;

/// Cashflows, their maturities and the price the model should reproduce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBasket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    cashflows: Vec<f64>,
    maturities: Vec<f64>,
    observed_price: f64,
}

impl PricingBasket {
    /// Creates an unlabelled basket.
    ///
    /// Nothing is validated here; [`Calibrator`](super::Calibrator) checks
    /// every basket before optimizing.
    #[must_use]
    pub fn new(cashflows: Vec<f64>, maturities: Vec<f64>, observed_price: f64) -> Self {
        Self {
            label: None,
            cashflows,
            maturities,
            observed_price,
        }
    }

    /// Attaches a display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the cashflow amounts.
    #[must_use]
    pub fn cashflows(&self) -> &[f64] {
        &self.cashflows
    }

    /// Returns the maturities in years.
    #[must_use]
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Returns the observed price.
    #[must_use]
    pub fn observed_price(&self) -> f64 {
        self.observed_price
    }

    /// Returns the longest maturity.
    #[must_use]
    pub fn last_maturity(&self) -> f64 {
        self.maturities.iter().copied().fold(0.0, f64::max)
    }

    /// Price of the basket's cashflows under `model`.
    pub fn model_price(&self, model: &NelsonSiegel) -> CurveResult<f64> {
        model.price(&self.cashflows, &self.maturities)
    }

    /// Label used in reports and errors: the explicit label, or `#n` for the
    /// basket at zero-based `index`.
    pub(crate) fn display_label(&self, index: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }

    /// Checks shapes and values before calibration.
    pub(crate) fn validate(&self, index: usize) -> CurveResult<()> {
        let name = self.display_label(index);

        if self.cashflows.is_empty() {
            return Err(CurveError::empty_cashflows(name));
        }
        if self.cashflows.len() != self.maturities.len() {
            return Err(CurveError::shape_mismatch(
                self.cashflows.len(),
                self.maturities.len(),
            ));
        }
        if !self.observed_price.is_finite() {
            return Err(CurveError::invalid_instrument(
                name,
                format!("observed price is not finite: {}", self.observed_price),
            ));
        }

        for (i, (&amount, &maturity)) in self.cashflows.iter().zip(&self.maturities).enumerate() {
            if !amount.is_finite() || !maturity.is_finite() {
                return Err(CurveError::invalid_instrument(
                    name,
                    format!("cashflow {i} has non-finite amount or maturity"),
                ));
            }
            if maturity < 0.0 {
                return Err(CurveError::invalid_date_order(format!(
                    "'{name}' cashflow {i} has negative maturity {maturity}"
                )));
            }
            if maturity == 0.0 {
                return Err(CurveError::degenerate_maturity(name, i, maturity));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(PricingBasket::new(vec![108.0], vec![0.75], 99.0).validate(0).is_ok());

        assert!(matches!(
            PricingBasket::new(vec![], vec![], 99.0).validate(0),
            Err(CurveError::EmptyCashflowList { .. })
        ));
        assert!(matches!(
            PricingBasket::new(vec![8.0, 108.0], vec![1.0], 99.0).validate(0),
            Err(CurveError::ShapeMismatch {
                cashflows: 2,
                maturities: 1
            })
        ));
        assert!(matches!(
            PricingBasket::new(vec![108.0], vec![-0.5], 99.0).validate(0),
            Err(CurveError::InvalidDateOrder { .. })
        ));
        assert!(matches!(
            PricingBasket::new(vec![108.0], vec![0.0], 99.0).validate(0),
            Err(CurveError::DegenerateMaturity { .. })
        ));
        assert!(matches!(
            PricingBasket::new(vec![108.0], vec![1.0], f64::NAN).validate(0),
            Err(CurveError::InvalidInstrument { .. })
        ));
        assert!(matches!(
            PricingBasket::new(vec![f64::NAN], vec![1.0], 99.0).validate(0),
            Err(CurveError::InvalidInstrument { .. })
        ));
    }

    #[test]
    fn test_labels() {
        let basket = PricingBasket::new(vec![108.0], vec![0.75], 99.0);
        assert_eq!(basket.display_label(2), "#3");

        let basket = basket.with_label("RIKB 25 0612");
        assert_eq!(basket.display_label(2), "RIKB 25 0612");
        assert_eq!(basket.last_maturity(), 0.75);
    }

    #[test]
    fn test_serde() {
        let basket: PricingBasket = serde_json::from_str(
            r#"{"cashflows":[5.0,105.0],"maturities":[1.0,2.0],"observed_price":101.5}"#,
        )
        .unwrap();
        assert_eq!(basket.label(), None);
        assert_eq!(basket.observed_price(), 101.5);
    }
}
