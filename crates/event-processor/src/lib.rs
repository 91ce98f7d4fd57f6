//! # Stressvar Event Processor
//!
//! Frames each event date in an analysis window, weights each portfolio at the start
//! of that window, and runs rolling VaR/CVaR plus a violation backtest over it.
//!
//! The processor is synchronous and reads a single immutable `MarketSnapshot`; all
//! downloading happens before it starts.

pub mod error;
pub mod processor;
pub mod study;

pub use error::ProcessError;
pub use processor::EventWindowProcessor;
pub use study::{BacktestRow, CellArtifacts, CellFailure, CvarSummary, EventStudy, SummaryRow};
