//! # Stressvar Core Types
//!
//! The shared vocabulary of the workspace: instruments, the date-indexed price and
//! return tables, portfolios, event windows and the per-cell result records.
//!
//! Every other crate depends on this one and it depends on nothing internal.

pub mod error;
pub mod market;
pub mod portfolio;
pub mod records;
pub mod series;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use market::{Instrument, InstrumentTable, PriceTable, ReturnTable};
pub use portfolio::{Portfolio, WeightVector};
pub use records::ViolationRecord;
pub use series::{DatedSeries, RiskSeries};
pub use window::{EventWindow, WindowSpec};
