//! # Stressvar Market Data
//!
//! Adapters that turn an external source of daily closes into a core `PriceTable`.
//!
//! - `PriceProvider`: the contract the rest of the application depends on.
//! - `YahooClient`: downloads daily closes from the Yahoo Finance chart API.
//! - `CsvPriceStore`: reads and writes a local wide-format CSV snapshot.
//!
//! Providers never fill gaps: a day without a close is simply absent from the table.

pub mod csv_store;
pub mod error;
pub mod responses;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Instrument, PriceTable};
use std::collections::BTreeSet;

pub use csv_store::CsvPriceStore;
pub use error::MarketDataError;
pub use yahoo::YahooClient;

/// The abstract source of daily closing prices.
///
/// This trait lets the command line swap a live download for a frozen snapshot
/// (and tests for an in-memory table) without the core noticing.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily closes for `tickers` on every trading date in `[start, end]`.
    async fn get_daily_closes(
        &self,
        tickers: &BTreeSet<Instrument>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, MarketDataError>;
}
