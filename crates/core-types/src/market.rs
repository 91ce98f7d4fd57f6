use crate::error::CoreError;
use crate::series::DatedSeries;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// A tradable instrument, identified only by its ticker symbol (e.g. "SCCO", "GLEN.L").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instrument(String);

impl Instrument {
    /// Creates an instrument from a ticker. Surrounding whitespace is trimmed and an
    /// empty ticker is rejected.
    pub fn new(ticker: impl Into<String>) -> Result<Self, CoreError> {
        let ticker = ticker.into();
        let trimmed = ticker.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "ticker".to_string(),
                "ticker symbol cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Instrument {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::new(s)
    }
}

impl TryFrom<String> for Instrument {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Instrument::new(value)
    }
}

impl From<Instrument> for String {
    fn from(value: Instrument) -> Self {
        value.0
    }
}

impl Borrow<str> for Instrument {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A date-indexed table of per-instrument values.
///
/// Dates are kept in a `BTreeMap`, so they are unique and iterate in strictly
/// increasing order. A missing observation is simply an absent entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentTable {
    rows: BTreeMap<NaiveDate, BTreeMap<Instrument, Decimal>>,
}

impl InstrumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a single observation.
    pub fn insert(&mut self, date: NaiveDate, instrument: Instrument, value: Decimal) {
        self.rows.entry(date).or_default().insert(instrument, value);
    }

    pub fn get(&self, date: NaiveDate, instrument: &Instrument) -> Option<Decimal> {
        self.rows.get(&date).and_then(|row| row.get(instrument)).copied()
    }

    /// Iterates rows in date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<Instrument, Decimal>)> + '_ {
        self.rows.iter().map(|(date, row)| (*date, row))
    }

    /// Iterates the rows whose date falls inside `range` (both ends inclusive).
    pub fn rows_in(
        &self,
        range: RangeInclusive<NaiveDate>,
    ) -> impl Iterator<Item = (NaiveDate, &BTreeMap<Instrument, Decimal>)> + '_ {
        self.rows.range(range).map(|(date, row)| (*date, row))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Every instrument with at least one observation, in ticker order.
    pub fn instruments(&self) -> BTreeSet<Instrument> {
        self.rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }

    /// The observations of a single instrument, skipping dates where it is absent.
    pub fn column(&self, instrument: &Instrument) -> DatedSeries {
        self.rows
            .iter()
            .filter_map(|(date, row)| row.get(instrument).map(|value| (*date, *value)))
            .collect()
    }

    /// Number of dates in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    /// Latest observation of `instrument` at or before `date`.
    fn as_of(&self, instrument: &Instrument, date: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        self.rows
            .range(..=date)
            .rev()
            .find_map(|(day, row)| row.get(instrument).map(|value| (*day, *value)))
    }
}

/// Daily closing prices: trading date -> instrument -> close.
///
/// Built once from a price provider and read-only afterwards. Only strictly
/// positive prices are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(InstrumentTable);

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a closing price, rejecting zero and negative values.
    pub fn insert(
        &mut self,
        date: NaiveDate,
        instrument: Instrument,
        price: Decimal,
    ) -> Result<(), CoreError> {
        if price <= Decimal::ZERO {
            return Err(CoreError::NonPositivePrice {
                instrument: instrument.to_string(),
                date,
                price,
            });
        }
        self.0.insert(date, instrument, price);
        Ok(())
    }

    /// Builds a table from `(date, instrument, price)` observations.
    pub fn from_observations<I>(observations: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (NaiveDate, Instrument, Decimal)>,
    {
        let mut table = Self::new();
        for (date, instrument, price) in observations {
            table.insert(date, instrument, price)?;
        }
        Ok(table)
    }

    pub fn get(&self, date: NaiveDate, instrument: &Instrument) -> Option<Decimal> {
        self.0.get(date, instrument)
    }

    /// The most recent price at or before `date`, together with the date it was observed.
    ///
    /// Markets may be closed on the requested day, so this walks back to the last
    /// known value instead of requiring an exact match.
    pub fn as_of(&self, instrument: &Instrument, date: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        self.0.as_of(instrument, date)
    }

    pub fn table(&self) -> &InstrumentTable {
        &self.0
    }

    pub fn column(&self, instrument: &Instrument) -> DatedSeries {
        self.0.column(instrument)
    }

    pub fn instruments(&self) -> BTreeSet<Instrument> {
        self.0.instruments()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Simple returns: trading date -> instrument -> `price(t) / price(t-1) - 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnTable(InstrumentTable);

impl ReturnTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, instrument: Instrument, value: Decimal) {
        self.0.insert(date, instrument, value);
    }

    pub fn get(&self, date: NaiveDate, instrument: &Instrument) -> Option<Decimal> {
        self.0.get(date, instrument)
    }

    pub fn table(&self) -> &InstrumentTable {
        &self.0
    }

    pub fn column(&self, instrument: &Instrument) -> DatedSeries {
        self.0.column(instrument)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
