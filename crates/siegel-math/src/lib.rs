//! # Siegel Math
//!
//! Numerical optimization for the Siegel curve calibration library.
//!
//! This crate provides:
//!
//! - **Least squares problems**: the [`LeastSquaresProblem`] trait, with an
//!   analytic or finite-difference Jacobian
//! - **Box constraints**: [`Bounds`] with projection and projected gradients
//! - **Optimizers**: projected BFGS (bounded quasi-Newton) and
//!   Levenberg-Marquardt, both respecting the box
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: non-finite trial points are rejected, never
//!   accepted into the iterate
//! - **Soft failure**: hitting an iteration budget is a result, not an error

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod optimization;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::optimization::{
        minimize, Bounds, LeastSquaresProblem, OptimizationConfig, OptimizationResult,
        OptimizerMethod, TerminationReason,
    };
}

pub use error::{MathError, MathResult};
