//! Least-squares fit of Nelson-Siegel parameters to basket prices.

use nalgebra::DMatrix;
use siegel_math::optimization::{minimize, LeastSquaresProblem};
use siegel_math::MathError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::basket::PricingBasket;
use super::config::CalibrationConfig;
use super::result::{CalibrationResult, PriceFit};
use crate::error::{CurveError, CurveResult};
use crate::nelson_siegel::{NelsonSiegel, NelsonSiegelParams, PARAMETER_COUNT};

/// Fits Nelson-Siegel parameters to observed basket prices.
///
/// Minimizes `Σ (price(basket, θ) - observed)²` over the box given by the
/// configured [`ParameterBounds`](super::ParameterBounds).
///
/// # Example
///
/// ```rust
/// use siegel_curves::prelude::*;
///
/// let truth = NelsonSiegel::new(NelsonSiegelParams::new(0.06, -0.02, 0.01, 1.5).unwrap());
/// let baskets: Vec<PricingBasket> = [0.5, 1.0, 2.0, 5.0, 10.0]
///     .iter()
///     .map(|&t| PricingBasket::new(vec![100.0], vec![t], 100.0 * truth.discount_factor(t)))
///     .collect();
///
/// let config = CalibrationConfig::default()
///     .with_method(OptimizerMethod::LevenbergMarquardt)
///     .with_tolerance(1e-15);
/// let result = Calibrator::new(config)
///     .calibrate(&baskets, NelsonSiegelParams::new(0.05, -0.01, 0.0, 1.0).unwrap())
///     .unwrap();
///
/// assert!(result.loss < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Creates a calibrator.
    #[must_use]
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrates to `baskets` starting from `initial`.
    ///
    /// A seed outside the parameter box is projected into it. Running out of
    /// iterations or evaluations is reported through
    /// [`CalibrationResult::converged`], not as an error.
    ///
    /// # Errors
    ///
    /// - `NoInstruments` if `baskets` is empty.
    /// - Basket validation errors (`EmptyCashflowList`, `ShapeMismatch`,
    ///   `InvalidDateOrder`, `DegenerateMaturity`, `InvalidInstrument`).
    /// - `InvalidBounds` or `NonPositiveLambda` for a malformed box.
    /// - `OptimizerDivergence` if the loss is not finite at the seed.
    pub fn calibrate(
        &self,
        baskets: &[PricingBasket],
        initial: NelsonSiegelParams,
    ) -> CurveResult<CalibrationResult> {
        if baskets.is_empty() {
            return Err(CurveError::NoInstruments);
        }
        for (index, basket) in baskets.iter().enumerate() {
            basket.validate(index)?;
        }
        let bounds = self.config.bounds.to_bounds()?;

        tracing::debug!(
            baskets = baskets.len(),
            method = %self.config.optimizer.method,
            seed = %initial,
            "starting calibration"
        );

        let problem = PricingProblem { baskets };
        let outcome = minimize(&problem, &initial.to_array(), &bounds, &self.config.optimizer)
            .map_err(|err| match err {
                MathError::NonFiniteObjective { value } => CurveError::OptimizerDivergence { value },
                other => CurveError::Math(other),
            })?;

        let mut values = [0.0; PARAMETER_COUNT];
        values.copy_from_slice(&outcome.parameters);
        let params = NelsonSiegelParams::from_array_unchecked(values);
        let model = NelsonSiegel::new(params);

        let price_fits = baskets
            .iter()
            .enumerate()
            .map(|(index, basket)| {
                let fitted = model.price_unchecked(basket.cashflows(), basket.maturities());
                PriceFit {
                    label: basket.display_label(index),
                    maturity: basket.last_maturity(),
                    observed: basket.observed_price(),
                    fitted,
                    residual: fitted - basket.observed_price(),
                }
            })
            .collect();

        let message = if outcome.converged {
            tracing::info!(
                loss = outcome.objective_value,
                iterations = outcome.iterations,
                params = %params,
                "calibration converged"
            );
            None
        } else {
            tracing::warn!(
                loss = outcome.objective_value,
                iterations = outcome.iterations,
                termination = %outcome.termination,
                "calibration did not converge"
            );
            Some(format!(
                "optimizer stopped without converging: {} after {} iterations",
                outcome.termination, outcome.iterations
            ))
        };

        Ok(CalibrationResult {
            params,
            loss: outcome.objective_value,
            gradient_norm: outcome.gradient_norm,
            converged: outcome.converged,
            message,
            iterations: outcome.iterations,
            evaluations: outcome.evaluations,
            termination: outcome.termination,
            price_fits,
        })
    }
}

/// Sum of squared pricing errors over `baskets` at `params`.
///
/// # Errors
///
/// `ShapeMismatch` if a basket is empty or its slices differ in length.
pub fn pricing_loss(baskets: &[PricingBasket], params: &NelsonSiegelParams) -> CurveResult<f64> {
    let model = NelsonSiegel::new(*params);
    let mut loss = 0.0;
    for basket in baskets {
        let residual = basket.model_price(&model)? - basket.observed_price();
        loss += residual * residual;
    }
    Ok(loss)
}

/// Residual `price(basket, θ) - observed` per basket, with the analytic
/// price gradient as Jacobian.
struct PricingProblem<'a> {
    baskets: &'a [PricingBasket],
}

impl PricingProblem<'_> {
    fn model(x: &[f64]) -> NelsonSiegel {
        let mut values = [0.0; PARAMETER_COUNT];
        values.copy_from_slice(x);
        NelsonSiegel::new(NelsonSiegelParams::from_array_unchecked(values))
    }

    fn residual(model: &NelsonSiegel, basket: &PricingBasket) -> f64 {
        model.price_unchecked(basket.cashflows(), basket.maturities()) - basket.observed_price()
    }
}

impl LeastSquaresProblem for PricingProblem<'_> {
    fn dimension(&self) -> usize {
        PARAMETER_COUNT
    }

    fn num_residuals(&self) -> usize {
        self.baskets.len()
    }

    #[cfg(not(feature = "parallel"))]
    fn residuals(&self, x: &[f64]) -> Vec<f64> {
        let model = Self::model(x);
        self.baskets
            .iter()
            .map(|basket| Self::residual(&model, basket))
            .collect()
    }

    // Collecting keeps basket order, so the sum of squares matches the
    // serial path bit for bit.
    #[cfg(feature = "parallel")]
    fn residuals(&self, x: &[f64]) -> Vec<f64> {
        let model = Self::model(x);
        self.baskets
            .par_iter()
            .map(|basket| Self::residual(&model, basket))
            .collect()
    }

    fn jacobian(&self, x: &[f64]) -> DMatrix<f64> {
        let model = Self::model(x);

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<[f64; PARAMETER_COUNT]> = self
            .baskets
            .iter()
            .map(|b| model.price_gradient_unchecked(b.cashflows(), b.maturities()))
            .collect();

        #[cfg(feature = "parallel")]
        let rows: Vec<[f64; PARAMETER_COUNT]> = self
            .baskets
            .par_iter()
            .map(|b| model.price_gradient_unchecked(b.cashflows(), b.maturities()))
            .collect();

        DMatrix::from_fn(rows.len(), PARAMETER_COUNT, |i, j| rows[i][j])
    }
}
