use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A date-indexed sequence of scalar values (returns, VaR, CVaR...).
///
/// Dates are unique and iterate in increasing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatedSeries {
    points: BTreeMap<NaiveDate, Decimal>,
}

/// Rolling VaR or CVaR output: one value per date that had a full lookback.
pub type RiskSeries = DatedSeries;

impl DatedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a point, replacing any existing value for that date.
    pub fn insert(&mut self, date: NaiveDate, value: Decimal) {
        self.points.insert(date, value);
    }

    pub fn get(&self, date: NaiveDate) -> Option<Decimal> {
        self.points.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, Decimal)> + '_ {
        self.points.iter().map(|(date, value)| (*date, *value))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.points.values().copied()
    }

    pub fn first(&self) -> Option<(NaiveDate, Decimal)> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.iter().next_back()
    }

    /// The points dated within `[start, end]`, both ends inclusive.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> DatedSeries {
        if start > end {
            return DatedSeries::new();
        }
        self.points
            .range(start..=end)
            .map(|(date, value)| (*date, *value))
            .collect()
    }

    /// The smallest value and its date; the earliest date wins a tie.
    pub fn min(&self) -> Option<(NaiveDate, Decimal)> {
        self.iter().fold(None, |best, (date, value)| match best {
            Some((_, current)) if current <= value => best,
            _ => Some((date, value)),
        })
    }

    /// Pairs the two series on the dates they share (inner join).
    pub fn align<'a>(
        &'a self,
        other: &'a DatedSeries,
    ) -> impl Iterator<Item = (NaiveDate, Decimal, Decimal)> + 'a {
        self.iter()
            .filter_map(move |(date, left)| other.get(date).map(|right| (date, left, right)))
    }
}

impl FromIterator<(NaiveDate, Decimal)> for DatedSeries {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Extend<(NaiveDate, Decimal)> for DatedSeries {
    fn extend<T: IntoIterator<Item = (NaiveDate, Decimal)>>(&mut self, iter: T) {
        self.points.extend(iter);
    }
}
