use crate::error::AnalyticsError;
use crate::returns::compute_returns;
use crate::weighting::compute_weights;
use chrono::NaiveDate;
use core_types::{DatedSeries, Portfolio, PriceTable, ReturnTable, WeightVector};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The immutable market state of a run: the price table and the returns derived from it.
///
/// It is built once, after the provider has delivered every ticker, and then shared by
/// reference with every (event, portfolio) computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    prices: PriceTable,
    returns: ReturnTable,
}

impl MarketSnapshot {
    pub fn new(prices: PriceTable) -> Result<Self, AnalyticsError> {
        let returns = compute_returns(&prices)?;
        tracing::info!(
            instruments = prices.instruments().len(),
            price_dates = prices.len(),
            return_dates = returns.len(),
            "Built market snapshot."
        );
        Ok(Self { prices, returns })
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn returns(&self) -> &ReturnTable {
        &self.returns
    }

    /// Price weights of `portfolio` as of `date`. See [`compute_weights`].
    pub fn weights(
        &self,
        portfolio: &Portfolio,
        date: NaiveDate,
    ) -> Result<WeightVector, AnalyticsError> {
        compute_weights(portfolio, date, &self.prices)
    }

    /// The fixed-weight portfolio return `sum(w(i) * r(i, t))` for each date in `[start, end]`.
    ///
    /// A date is kept only when every constituent has a return on it.
    pub fn weighted_returns(
        &self,
        portfolio: &Portfolio,
        weights: &WeightVector,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DatedSeries {
        let mut series = DatedSeries::new();
        if start > end {
            return series;
        }

        for (date, row) in self.returns.table().rows_in(start..=end) {
            let mut total = Decimal::ZERO;
            let mut complete = true;
            for instrument in portfolio.instruments() {
                match (row.get(instrument), weights.get(instrument)) {
                    (Some(value), Some(weight)) => total += weight * value,
                    _ => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                series.insert(date, total);
            }
        }

        series
    }
}
