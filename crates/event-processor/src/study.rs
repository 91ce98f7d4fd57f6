use crate::error::ProcessError;
use chrono::NaiveDate;
use core_types::{DatedSeries, EventWindow, RiskSeries, ViolationRecord, WeightVector};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Everything computed for one (event, portfolio) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellArtifacts {
    pub event: NaiveDate,
    pub portfolio: String,
    pub window: EventWindow,
    /// Weights fixed at the window start.
    pub weights: WeightVector,
    /// Weighted returns from the margin start to the window end.
    pub weighted_returns: DatedSeries,
    /// Weighted returns inside the analysis window.
    pub realized: DatedSeries,
    pub var: RiskSeries,
    pub cvar: RiskSeries,
    /// The most severe (lowest) CVaR in the window and its date. `None` when no date
    /// in the window had a full lookback.
    pub worst_cvar: Option<(NaiveDate, Decimal)>,
    pub backtest: ViolationRecord,
}

/// A cell that could not be computed. The rest of the study is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellFailure {
    pub event: NaiveDate,
    pub portfolio: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: ProcessError,
}

fn serialize_error<S: Serializer>(error: &ProcessError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// The cached result of one pass over every (event, portfolio) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStudy {
    /// Row order of the summary.
    pub events: Vec<NaiveDate>,
    /// Column order of the summary.
    pub portfolios: Vec<String>,
    pub cells: Vec<CellArtifacts>,
    pub failures: Vec<CellFailure>,
}

/// Worst CVaR per event (rows) and portfolio (columns), plus the column averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvarSummary {
    pub portfolios: Vec<String>,
    pub rows: Vec<SummaryRow>,
    /// Mean of each column over the events that have a value.
    pub average: Vec<Option<Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub event: NaiveDate,
    pub values: Vec<Option<Decimal>>,
}

/// One line of the backtest report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRow<'a> {
    pub event: NaiveDate,
    pub portfolio: &'a str,
    pub record: &'a ViolationRecord,
}

impl EventStudy {
    pub fn cell(&self, event: NaiveDate, portfolio: &str) -> Option<&CellArtifacts> {
        self.cells
            .iter()
            .find(|cell| cell.event == event && cell.portfolio == portfolio)
    }

    pub fn failure(&self, event: NaiveDate, portfolio: &str) -> Option<&CellFailure> {
        self.failures
            .iter()
            .find(|failure| failure.event == event && failure.portfolio == portfolio)
    }

    /// Builds the worst-CVaR table. Failed cells and cells without a CVaR are absent
    /// and do not count toward the average.
    pub fn cvar_summary(&self) -> CvarSummary {
        let rows: Vec<SummaryRow> = self
            .events
            .iter()
            .map(|event| SummaryRow {
                event: *event,
                values: self
                    .portfolios
                    .iter()
                    .map(|portfolio| {
                        self.cell(*event, portfolio)
                            .and_then(|cell| cell.worst_cvar)
                            .map(|(_, value)| value)
                    })
                    .collect(),
            })
            .collect();

        let average = (0..self.portfolios.len())
            .map(|column| {
                let present: Vec<Decimal> =
                    rows.iter().filter_map(|row| row.values[column]).collect();
                if present.is_empty() {
                    return None;
                }
                let sum: Decimal = present.iter().sum();
                sum.checked_div(Decimal::from(present.len()))
            })
            .collect();

        CvarSummary {
            portfolios: self.portfolios.clone(),
            rows,
            average,
        }
    }

    /// The violation record of every computed cell, in event then portfolio order.
    pub fn violation_records(&self) -> Vec<BacktestRow<'_>> {
        self.events
            .iter()
            .flat_map(|event| {
                self.portfolios.iter().filter_map(move |portfolio| {
                    self.cell(*event, portfolio).map(|cell| BacktestRow {
                        event: *event,
                        portfolio: &cell.portfolio,
                        record: &cell.backtest,
                    })
                })
            })
            .collect()
    }
}
