//! Domain types.
//!
//! - [`Date`]: Calendar date for financial calculations
//! - [`Cashflow`]: Dated cashflow amount
//! - [`Instrument`]: Named fixed-cashflow bond with a reference yield

mod cashflow;
mod date;
mod instrument;

pub use cashflow::Cashflow;
pub use date::Date;
pub use instrument::Instrument;
