//! # Siegel Curves
//!
//! Nelson-Siegel yield curves calibrated to coupon-bond prices.
//!
//! This crate provides:
//!
//! - **Model**: [`NelsonSiegel`] rates, discount factors, forward rates and
//!   cashflow prices, with analytic parameter gradients
//! - **Schedules**: [`CashflowSchedule`] discounts an instrument's cashflows
//!   at its flat reference yield
//! - **Calibration**: [`Calibrator`] fits the four parameters to a set of
//!   [`PricingBasket`]s under box constraints
//! - **Evaluation**: [`evaluate_curve`] tabulates the fitted curve over a
//!   maturity grid
//!
//! ## Quick Start
//!
//! ```rust
//! use siegel_curves::prelude::*;
//!
//! let params = NelsonSiegelParams::HISTORICAL_SEED;
//! let grid = linspace(0.1, 20.0, 5).unwrap();
//!
//! for point in evaluate_curve(&params, &grid) {
//!     assert!(point.discount_factor > 0.0);
//! }
//! ```
//!
//! ## Features
//!
//! - `parallel`: price baskets on the rayon thread pool during calibration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]

pub mod calibration;
pub mod error;
pub mod evaluation;
pub mod nelson_siegel;
pub mod schedule;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calibration::{
        pricing_loss, CalibrationConfig, CalibrationResult, Calibrator, ParameterBounds,
        ParameterRange, PriceFit, PricingBasket, DEFAULT_LAMBDA_FLOOR,
    };
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::evaluation::{
        annual_to_continuous, continuous_to_annual, evaluate_curve, linspace, maturity_fit,
        yield_from_discount_factor, CurvePoint, MaturityFit,
    };
    pub use crate::nelson_siegel::{NelsonSiegel, NelsonSiegelParams, SHORT_END_EPSILON};
    pub use crate::schedule::{build_schedule, CashflowSchedule, ScheduleEntry};
    pub use siegel_math::optimization::{OptimizerMethod, TerminationReason};
}

pub use calibration::{CalibrationConfig, CalibrationResult, Calibrator, PricingBasket};
pub use error::{CurveError, CurveResult};
pub use evaluation::{evaluate_curve, maturity_fit, CurvePoint, MaturityFit};
pub use nelson_siegel::{NelsonSiegel, NelsonSiegelParams};
pub use schedule::{build_schedule, CashflowSchedule};
