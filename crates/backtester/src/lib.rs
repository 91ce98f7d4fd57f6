//! # Stressvar Backtester
//!
//! Counts the days on which realized returns breached the VaR forecast.
//!
//! - `backtest`: compares an already computed VaR series with realized returns.
//! - `Backtester`: recomputes rolling VaR from a return series and backtests a period
//!   of it, for studies that do not already hold the VaR.

use chrono::NaiveDate;
use core_types::{DatedSeries, RiskSeries, ViolationRecord};
use risk::RollingWindow;

pub mod error;

pub use error::BacktestError;

/// Compares `realized` returns with `var` on the dates both series share.
///
/// A date is a violation when the realized return is strictly below the VaR; a
/// return exactly equal to VaR is not. Dates present in only one series are dropped.
pub fn backtest(realized: &DatedSeries, var: &RiskSeries) -> ViolationRecord {
    let mut sample_size = 0;
    let mut violation_dates = Vec::new();
    for (date, actual, forecast) in realized.align(var) {
        sample_size += 1;
        if actual < forecast {
            violation_dates.push(date);
        }
    }
    ViolationRecord::new(violation_dates, sample_size)
}

/// Rolling VaR followed by a violation count over a period.
///
/// Standalone entry point for studies that hold only a return series. The event
/// processor already has each cell's VaR and calls [`backtest`] directly.
#[derive(Debug, Clone, Copy)]
pub struct Backtester {
    window: RollingWindow,
}

impl Backtester {
    pub fn new(window: RollingWindow) -> Self {
        Self { window }
    }

    /// Forecasts VaR over the whole of `returns` (so the period can use lookback from
    /// before `start`), then backtests the dates in `[start, end]`.
    pub fn run(
        &self,
        returns: &DatedSeries,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ViolationRecord, BacktestError> {
        if start > end {
            return Err(BacktestError::InvalidPeriod(format!(
                "start {start} is after end {end}"
            )));
        }
        let var = self.window.apply(returns)?.var.between(start, end);
        let record = backtest(&returns.between(start, end), &var);
        tracing::debug!(
            %start,
            %end,
            violations = record.violations,
            sample = record.sample_size,
            "Backtested VaR."
        );
        Ok(record)
    }
}
