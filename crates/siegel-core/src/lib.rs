//! # Siegel Core
//!
//! Core types for the Siegel term-structure calibration library.
//!
//! This crate provides the plain data the calibration engine consumes:
//!
//! - **Types**: [`Date`], [`Cashflow`] and [`Instrument`]
//! - **Day Count Conventions**: date spans to fractional years, with a
//!   configurable year length
//!
//! ## Example
//!
//! ```rust
//! use siegel_core::prelude::*;
//!
//! let today = Date::from_ymd(2024, 9, 12).unwrap();
//! let payment = Date::from_ymd(2025, 6, 12).unwrap();
//!
//! let t = ActualFixed::default().year_fraction(today, payment);
//! assert!(t > 0.74 && t < 0.75);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]

pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::{year_fraction, ActualFixed, DayCount};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Cashflow, Date, Instrument};
}

pub use error::{CoreError, CoreResult};
pub use types::{Cashflow, Date, Instrument};
