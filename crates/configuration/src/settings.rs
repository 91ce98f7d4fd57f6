use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{EventWindow, Instrument, Portfolio, WindowSpec};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The market-stress dates to study, in report row order.
    pub event_dates: Vec<NaiveDate>,
    /// The portfolios to study, in report column order.
    pub portfolios: Vec<PortfolioConfig>,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub windows: WindowSettings,
    pub data: DataSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// A named list of tickers, as written in the `[[portfolios]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioConfig {
    pub name: String,
    pub instruments: Vec<String>,
}

/// Parameters of the rolling VaR/CVaR estimation.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskSettings {
    /// Number of trailing observations in each rolling window.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Tail probability of the VaR quantile (0.05 for a 95% VaR).
    #[serde(default = "default_tail_probability")]
    pub tail_probability: Decimal,
}

/// Sizing of the analysis window around each event date.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_analysis_months")]
    pub analysis_months: u32,
    #[serde(default = "default_margin_days")]
    pub margin_days: u32,
}

/// Where the daily closes come from and which range to load.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default)]
    pub source: DataSource,
    /// The CSV snapshot read by the `csv` source and written by `backfill`.
    #[serde(default = "default_prices_path")]
    pub prices_path: PathBuf,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
}

/// Available price providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// A local CSV snapshot.
    #[default]
    Csv,
    /// Yahoo Finance daily chart data.
    Yahoo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

// --- Default Implementations ---
// These allow a user to omit whole sections from their toml and still get the
// standard 21-day / 95% / ±2 months / 32-day setup.

fn default_window() -> usize {
    21
}

fn default_tail_probability() -> Decimal {
    Decimal::new(5, 2)
}

fn default_analysis_months() -> u32 {
    WindowSpec::default().analysis_months
}

fn default_margin_days() -> u32 {
    WindowSpec::default().margin_days
}

fn default_prices_path() -> PathBuf {
    PathBuf::from("data/prices.csv")
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "stressvar.log".to_string()
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            window: default_window(),
            tail_probability: default_tail_probability(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            analysis_months: default_analysis_months(),
            margin_days: default_margin_days(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}

impl WindowSettings {
    pub fn spec(&self) -> WindowSpec {
        WindowSpec {
            analysis_months: self.analysis_months,
            margin_days: self.margin_days,
        }
    }
}

impl Config {
    /// Checks the cross-field rules that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolios.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[portfolios]] entry is required".to_string(),
            ));
        }
        if self.event_dates.is_empty() {
            return Err(ConfigError::ValidationError(
                "event_dates cannot be empty".to_string(),
            ));
        }

        let mut dates = HashSet::new();
        for date in &self.event_dates {
            if !dates.insert(date) {
                return Err(ConfigError::ValidationError(format!(
                    "event date {date} is listed more than once"
                )));
            }
        }

        let mut names = HashSet::new();
        for portfolio in &self.portfolios {
            if !names.insert(portfolio.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "portfolio name '{}' is used more than once",
                    portfolio.name
                )));
            }
        }
        // Builds every portfolio once so ticker and duplicate errors surface here.
        self.build_portfolios()?;

        if self.risk.window == 0 {
            return Err(ConfigError::ValidationError(
                "risk.window must be at least 1".to_string(),
            ));
        }
        if self.risk.tail_probability <= Decimal::ZERO || self.risk.tail_probability >= Decimal::ONE
        {
            return Err(ConfigError::ValidationError(
                "risk.tail_probability must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if self.data.start > self.data.end {
            return Err(ConfigError::ValidationError(format!(
                "data.start ({}) is after data.end ({})",
                self.data.start, self.data.end
            )));
        }

        let spec = self.windows.spec();
        for anchor in &self.event_dates {
            EventWindow::around(*anchor, &spec)?;
        }

        Ok(())
    }

    /// Logs a warning for every event whose margin or window reaches outside
    /// `[data.start, data.end]`. Such events still run, on a shorter series.
    pub fn warn_on_uncovered_windows(&self) {
        let spec = self.windows.spec();
        for anchor in &self.event_dates {
            let Ok(window) = EventWindow::around(*anchor, &spec) else {
                continue;
            };
            if window.margin_start < self.data.start || window.window_end > self.data.end {
                tracing::warn!(
                    event = %anchor,
                    margin_start = %window.margin_start,
                    window_end = %window.window_end,
                    "Event window reaches outside the configured data range; its series will be short."
                );
            }
        }
    }

    /// Converts the configured portfolios into core `Portfolio` values, keeping file order.
    pub fn build_portfolios(&self) -> Result<Vec<Portfolio>, ConfigError> {
        self.portfolios
            .iter()
            .map(|p| {
                let instruments = p
                    .instruments
                    .iter()
                    .map(Instrument::new)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Portfolio::new(p.name.clone(), instruments)?)
            })
            .collect()
    }

    /// The union of all tickers across portfolios, each listed once.
    pub fn all_instruments(&self) -> Result<BTreeSet<Instrument>, ConfigError> {
        Ok(self
            .build_portfolios()?
            .iter()
            .flat_map(|p| p.instruments().iter().cloned())
            .collect())
    }
}
