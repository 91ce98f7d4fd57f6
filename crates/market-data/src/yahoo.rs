use crate::error::MarketDataError;
use crate::responses::ChartResponse;
use crate::PriceProvider;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use core_types::{Instrument, PriceTable};
use futures::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeSet;

/// A `PriceProvider` backed by the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        // The endpoint rejects requests that carry no browser-like user agent.
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (compatible; stressvar/0.1)"),
        );

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the daily closes of one ticker for `[start, end]`.
    pub async fn fetch_closes(
        &self,
        ticker: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let period1 = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive, so ask for one extra day to keep `end` inclusive.
        let period2 = end
            .checked_add_days(Days::new(1))
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() && text.trim().is_empty() {
            return Err(MarketDataError::Provider {
                ticker: ticker.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let closes = parse_chart(ticker, &text, start, end)?;
        tracing::debug!(%ticker, observations = closes.len(), "Fetched daily closes.");
        Ok(closes)
    }
}

/// Decodes a chart response body into `(trading date, close)` pairs within `[start, end]`.
///
/// Timestamps are shifted by the exchange's UTC offset before taking the date, so a
/// session that opens at 09:30 New York time is dated on its local calendar day.
pub fn parse_chart(
    ticker: &Instrument,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, Decimal)>, MarketDataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(MarketDataError::Provider {
            ticker: ticker.to_string(),
            message: format!("{}: {}", error.code, error.description),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketDataError::Provider {
            ticker: ticker.to_string(),
            message: "response carried no result".to_string(),
        })?;

    let closes = match result.indicators.quote.into_iter().next() {
        Some(quote) => quote.close,
        None => Vec::new(),
    };
    if closes.len() != result.timestamp.len() {
        return Err(MarketDataError::InvalidData(format!(
            "{ticker}: {} timestamps but {} closes",
            result.timestamp.len(),
            closes.len()
        )));
    }

    let offset = result.meta.gmtoffset;
    let mut observations = Vec::with_capacity(closes.len());
    for (timestamp, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let date = DateTime::from_timestamp(timestamp + offset, 0)
            .ok_or_else(|| {
                MarketDataError::InvalidData(format!("{ticker}: invalid timestamp {timestamp}"))
            })?
            .date_naive();
        if date < start || date > end {
            continue;
        }
        let price = Decimal::from_f64(close).ok_or_else(|| {
            MarketDataError::InvalidData(format!("{ticker}: close {close} on {date} is not finite"))
        })?;
        observations.push((date, price.normalize()));
    }

    // A trailing intraday print can repeat the last session's date; keep the latest.
    observations.dedup_by(|later, earlier| {
        if later.0 == earlier.0 {
            earlier.1 = later.1;
            true
        } else {
            false
        }
    });

    Ok(observations)
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn get_daily_closes(
        &self,
        tickers: &BTreeSet<Instrument>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, MarketDataError> {
        // Fetch every ticker concurrently; the table is assembled once all have arrived.
        let fetches = tickers
            .iter()
            .map(|ticker| self.fetch_closes(ticker, start, end));
        let results = join_all(fetches).await;

        let mut table = PriceTable::new();
        for (ticker, result) in tickers.iter().zip(results) {
            let closes = result?;
            if closes.is_empty() {
                tracing::warn!(%ticker, "Provider returned no closes in the requested range.");
            }
            for (date, price) in closes {
                table.insert(date, ticker.clone(), price)?;
            }
        }

        tracing::info!(
            tickers = tickers.len(),
            dates = table.len(),
            "Downloaded daily closes from Yahoo Finance."
        );
        Ok(table)
    }
}
