//! The Nelson-Siegel term structure model.
//!
//! The continuously compounded zero rate at maturity `τ` is
//!
//! ```text
//! r(τ) = θ₀ + θ₁ · L₁(τ/λ) + θ₂ · L₂(τ/λ)
//!
//! L₁(x) = (1 - e^(-x)) / x
//! L₂(x) = L₁(x) - e^(-x)
//! ```
//!
//! - θ₀: long-run level, the limit of `r` as `τ → ∞`
//! - θ₀ + θ₁: instantaneous short rate, the limit as `τ → 0`
//! - θ₂: hump (θ₂ > 0) or trough (θ₂ < 0) in the medium term
//! - λ: decay scale in years, strictly positive
//!
//! Discount factors are `e^(-r(τ)·τ)` and a cashflow set is priced as the
//! sum of its discounted amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CurveError, CurveResult};

/// Below this maturity (or scaled maturity `τ/λ`) the loadings take their
/// limiting values `L₁ = 1`, `L₂ = 0`.
pub const SHORT_END_EPSILON: f64 = 1e-8;

/// Number of model parameters.
pub const PARAMETER_COUNT: usize = 4;

/// Parameter names in vector order.
pub const PARAMETER_NAMES: [&str; PARAMETER_COUNT] = ["theta0", "theta1", "theta2", "lambda"];

/// Nelson-Siegel parameters `(θ₀, θ₁, θ₂, λ)`.
///
/// All four are finite and `λ > 0`; the constructor enforces both.
///
/// # Example
///
/// ```rust
/// use siegel_curves::NelsonSiegelParams;
///
/// let params = NelsonSiegelParams::new(0.05, -0.04, 0.03, 0.2).unwrap();
/// assert_eq!(params, NelsonSiegelParams::HISTORICAL_SEED);
///
/// assert!(NelsonSiegelParams::new(0.05, -0.04, 0.03, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct NelsonSiegelParams {
    theta0: f64,
    theta1: f64,
    theta2: f64,
    lambda: f64,
}

impl NelsonSiegelParams {
    /// Starting point used for the Icelandic treasury basket:
    /// `(0.05, -0.04, 0.03, 0.2)`.
    pub const HISTORICAL_SEED: Self = Self {
        theta0: 0.05,
        theta1: -0.04,
        theta2: 0.03,
        lambda: 0.2,
    };

    /// Creates a parameter set.
    ///
    /// # Errors
    ///
    /// - `NonPositiveLambda` if `lambda <= 0`.
    /// - `InvalidInstrument` if any parameter is NaN or infinite.
    pub fn new(theta0: f64, theta1: f64, theta2: f64, lambda: f64) -> CurveResult<Self> {
        let values = [theta0, theta1, theta2, lambda];
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(CurveError::invalid_instrument(
                "nelson-siegel parameters",
                format!("{} must be finite, got {}", PARAMETER_NAMES[i], values[i]),
            ));
        }
        if lambda <= 0.0 {
            return Err(CurveError::NonPositiveLambda { lambda });
        }

        Ok(Self {
            theta0,
            theta1,
            theta2,
            lambda,
        })
    }

    /// Builds parameters from a `[θ₀, θ₁, θ₂, λ]` slice.
    pub fn from_slice(values: &[f64]) -> CurveResult<Self> {
        match *values {
            [theta0, theta1, theta2, lambda] => Self::new(theta0, theta1, theta2, lambda),
            _ => Err(CurveError::Math(siegel_math::MathError::dimension_mismatch(
                PARAMETER_COUNT,
                values.len(),
            ))),
        }
    }

    /// Wraps optimizer output that already lies inside a box with a
    /// positive λ floor.
    pub(crate) fn from_array_unchecked(values: [f64; PARAMETER_COUNT]) -> Self {
        let [theta0, theta1, theta2, lambda] = values;
        Self {
            theta0,
            theta1,
            theta2,
            lambda,
        }
    }

    /// Long-run level θ₀.
    #[must_use]
    pub fn theta0(&self) -> f64 {
        self.theta0
    }

    /// Slope loading weight θ₁.
    #[must_use]
    pub fn theta1(&self) -> f64 {
        self.theta1
    }

    /// Curvature loading weight θ₂.
    #[must_use]
    pub fn theta2(&self) -> f64 {
        self.theta2
    }

    /// Decay scale λ.
    #[must_use]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Returns `[θ₀, θ₁, θ₂, λ]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; PARAMETER_COUNT] {
        [self.theta0, self.theta1, self.theta2, self.lambda]
    }
}

impl fmt::Display for NelsonSiegelParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "θ0={:.6}, θ1={:.6}, θ2={:.6}, λ={:.6}",
            self.theta0, self.theta1, self.theta2, self.lambda
        )
    }
}

#[derive(Deserialize)]
struct RawParams {
    theta0: f64,
    theta1: f64,
    theta2: f64,
    lambda: f64,
}

impl TryFrom<RawParams> for NelsonSiegelParams {
    type Error = CurveError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        Self::new(raw.theta0, raw.theta1, raw.theta2, raw.lambda)
    }
}

/// Basis loadings at one maturity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurveFactor {
    /// `L₁`, weight of θ₁.
    pub slope: f64,
    /// `L₂`, weight of θ₂.
    pub curvature: f64,
    /// `∂L₁/∂λ`.
    pub d_slope: f64,
    /// `∂L₂/∂λ`.
    pub d_curvature: f64,
}

/// Computes both loadings once for `(τ, λ)`.
///
/// Uses the limit branch when `τ` or `τ/λ` is at most
/// [`SHORT_END_EPSILON`], so no `0/0` is ever formed.
pub(crate) fn curve_factor(tau: f64, lambda: f64) -> CurveFactor {
    let x = tau / lambda;
    if tau <= SHORT_END_EPSILON || x <= SHORT_END_EPSILON {
        return CurveFactor {
            slope: 1.0,
            curvature: 0.0,
            d_slope: 0.0,
            d_curvature: 0.0,
        };
    }

    let decay = (-x).exp();
    let slope = -(-x).exp_m1() / x;
    let curvature = slope - decay;

    CurveFactor {
        slope,
        curvature,
        d_slope: curvature / lambda,
        d_curvature: (curvature - x * decay) / lambda,
    }
}

/// Nelson-Siegel curve for one parameter set.
///
/// # Example
///
/// ```rust
/// use siegel_curves::{NelsonSiegel, NelsonSiegelParams};
///
/// let model = NelsonSiegel::new(NelsonSiegelParams::new(0.06, -0.02, 0.01, 1.5).unwrap());
///
/// // Short end converges to θ₀ + θ₁, long end to θ₀.
/// assert!((model.rate(0.0) - 0.04).abs() < 1e-15);
/// assert!((model.rate(1e6) - 0.06).abs() < 1e-6);
///
/// let price = model.price(&[5.0, 105.0], &[1.0, 2.0]).unwrap();
/// assert!(price < 110.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelsonSiegel {
    params: NelsonSiegelParams,
}

impl NelsonSiegel {
    /// Creates the model.
    #[must_use]
    pub fn new(params: NelsonSiegelParams) -> Self {
        Self { params }
    }

    /// Returns the parameters.
    #[must_use]
    pub fn params(&self) -> &NelsonSiegelParams {
        &self.params
    }

    /// Continuously compounded zero rate at maturity `tau`.
    #[must_use]
    pub fn rate(&self, tau: f64) -> f64 {
        let p = &self.params;
        let cf = curve_factor(tau, p.lambda);
        p.theta0 + p.theta1 * cf.slope + p.theta2 * cf.curvature
    }

    /// Discount factor `e^(-r(τ)·τ)`.
    #[must_use]
    pub fn discount_factor(&self, tau: f64) -> f64 {
        (-self.rate(tau) * tau).exp()
    }

    /// Instantaneous forward rate `θ₀ + θ₁·e^(-x) + θ₂·x·e^(-x)`, `x = τ/λ`.
    #[must_use]
    pub fn forward_rate(&self, tau: f64) -> f64 {
        let p = &self.params;
        let x = (tau / p.lambda).max(0.0);
        let decay = (-x).exp();
        p.theta0 + p.theta1 * decay + p.theta2 * x * decay
    }

    /// Gradient of the zero rate with respect to `(θ₀, θ₁, θ₂, λ)`.
    #[must_use]
    pub fn rate_gradient(&self, tau: f64) -> [f64; PARAMETER_COUNT] {
        let p = &self.params;
        let cf = curve_factor(tau, p.lambda);
        [
            1.0,
            cf.slope,
            cf.curvature,
            p.theta1 * cf.d_slope + p.theta2 * cf.d_curvature,
        ]
    }

    /// Prices a cashflow set: `Σ cashflow_i · DF(maturity_i)`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if either slice is empty or their lengths differ.
    pub fn price(&self, cashflows: &[f64], maturities: &[f64]) -> CurveResult<f64> {
        check_shape(cashflows, maturities)?;
        Ok(self.price_unchecked(cashflows, maturities))
    }

    /// Gradient of [`price`](Self::price) with respect to `(θ₀, θ₁, θ₂, λ)`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if either slice is empty or their lengths differ.
    pub fn price_gradient(
        &self,
        cashflows: &[f64],
        maturities: &[f64],
    ) -> CurveResult<[f64; PARAMETER_COUNT]> {
        check_shape(cashflows, maturities)?;
        Ok(self.price_gradient_unchecked(cashflows, maturities))
    }

    pub(crate) fn price_unchecked(&self, cashflows: &[f64], maturities: &[f64]) -> f64 {
        cashflows
            .iter()
            .zip(maturities)
            .map(|(&c, &tau)| c * self.discount_factor(tau))
            .sum()
    }

    pub(crate) fn price_gradient_unchecked(
        &self,
        cashflows: &[f64],
        maturities: &[f64],
    ) -> [f64; PARAMETER_COUNT] {
        let mut gradient = [0.0; PARAMETER_COUNT];
        for (&c, &tau) in cashflows.iter().zip(maturities) {
            // ∂(c·e^(-rτ))/∂θ = -c·τ·DF·∂r/∂θ
            let weight = -c * tau * self.discount_factor(tau);
            for (g, dr) in gradient.iter_mut().zip(self.rate_gradient(tau)) {
                *g += weight * dr;
            }
        }
        gradient
    }
}

impl From<NelsonSiegelParams> for NelsonSiegel {
    fn from(params: NelsonSiegelParams) -> Self {
        Self::new(params)
    }
}

fn check_shape(cashflows: &[f64], maturities: &[f64]) -> CurveResult<()> {
    if cashflows.is_empty() || cashflows.len() != maturities.len() {
        return Err(CurveError::shape_mismatch(cashflows.len(), maturities.len()));
    }
    Ok(())
}
