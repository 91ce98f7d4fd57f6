//! # Stressvar Analytics
//!
//! Pure transformations over the price data that every event window shares.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O, no clock. It depends only on `core-types`.
//! - **Built once:** a `MarketSnapshot` derives the return table from the price table
//!   a single time; every (event, portfolio) cell then reads from it.
//!
//! ## Public API
//!
//! - `compute_returns`: simple returns per instrument over its own observations.
//! - `compute_weights`: price weighting from as-of prices.
//! - `MarketSnapshot`: the immutable prices + returns pair, with weighted return series.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod returns;
pub mod snapshot;
pub mod weighting;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use returns::compute_returns;
pub use snapshot::MarketSnapshot;
pub use weighting::compute_weights;
