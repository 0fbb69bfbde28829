//! Calibration of Nelson-Siegel parameters to bond prices.
//!
//! A [`Calibrator`] fits the four model parameters to a set of
//! [`PricingBasket`]s by minimizing the sum of squared price errors with a
//! bounded optimizer from `siegel-math`.
//!
//! Baskets are usually built from instrument schedules:
//!
//! ```rust
//! use siegel_core::prelude::*;
//! use siegel_curves::prelude::*;
//!
//! let today = Date::from_ymd(2024, 9, 12).unwrap();
//! let bond = Instrument::from_parts(
//!     "RIKB 25 0612",
//!     &[Date::from_ymd(2025, 6, 12).unwrap()],
//!     &[108.0],
//!     0.0915,
//! )
//! .unwrap();
//!
//! let schedule = CashflowSchedule::for_instrument(today, &bond, &ActualFixed::default()).unwrap();
//! let basket = schedule.to_basket(bond.name());
//! assert_eq!(basket.cashflows(), &[108.0]);
//! ```

mod basket;
mod calibrator;
mod config;
mod result;

pub use basket::PricingBasket;
pub use calibrator::{pricing_loss, Calibrator};
pub use config::{CalibrationConfig, ParameterBounds, ParameterRange, DEFAULT_LAMBDA_FLOOR};
pub use result::{CalibrationResult, PriceFit};
