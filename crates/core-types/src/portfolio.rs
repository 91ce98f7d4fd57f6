use crate::error::CoreError;
use crate::market::Instrument;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named, immutable set of instruments.
///
/// Instruments keep the order they were configured in, which fixes the column
/// order of every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    name: String,
    instruments: Vec<Instrument>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>, instruments: Vec<Instrument>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "portfolio.name".to_string(),
                "portfolio name cannot be empty".to_string(),
            ));
        }
        if instruments.is_empty() {
            return Err(CoreError::InvalidInput(
                format!("portfolio '{name}'"),
                "a portfolio needs at least one instrument".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(instruments.len());
        for instrument in &instruments {
            if !seen.insert(instrument) {
                return Err(CoreError::InvalidInput(
                    format!("portfolio '{name}'"),
                    format!("instrument {instrument} is listed more than once"),
                ));
            }
        }
        Ok(Self { name, instruments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// Per-instrument weights of one portfolio for one event window.
///
/// Computed once at the start of the window and held fixed; iterates in the
/// portfolio's instrument order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightVector {
    weights: Vec<(Instrument, Decimal)>,
}

impl WeightVector {
    pub fn new(weights: Vec<(Instrument, Decimal)>) -> Self {
        Self { weights }
    }

    pub fn get(&self, instrument: &Instrument) -> Option<Decimal> {
        self.weights
            .iter()
            .find(|(candidate, _)| candidate == instrument)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Instrument, Decimal)> + '_ {
        self.weights.iter().map(|(instrument, weight)| (instrument, *weight))
    }

    /// Sum of all weights; 1 up to rounding for a fully priced portfolio.
    pub fn total(&self) -> Decimal {
        self.weights.iter().map(|(_, weight)| *weight).sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
