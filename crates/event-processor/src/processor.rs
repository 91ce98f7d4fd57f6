use crate::error::ProcessError;
use crate::study::{CellArtifacts, CellFailure, EventStudy};
use analytics::MarketSnapshot;
use chrono::NaiveDate;
use configuration::Config;
use core_types::{EventWindow, Portfolio, WindowSpec};
use indicatif::{ProgressBar, ProgressStyle};
use risk::RollingWindow;

/// Runs the VaR/CVaR study for every configured event and portfolio.
///
/// Each cell is computed exactly once and cached in the returned `EventStudy`; the
/// summary table, the backtest report and the export all read from that cache.
#[derive(Debug, Clone)]
pub struct EventWindowProcessor {
    events: Vec<NaiveDate>,
    portfolios: Vec<Portfolio>,
    rolling: RollingWindow,
    spec: WindowSpec,
    show_progress: bool,
}

impl EventWindowProcessor {
    pub fn new(
        events: Vec<NaiveDate>,
        portfolios: Vec<Portfolio>,
        rolling: RollingWindow,
        spec: WindowSpec,
    ) -> Self {
        Self {
            events,
            portfolios,
            rolling,
            spec,
            show_progress: true,
        }
    }

    /// Builds a processor from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, ProcessError> {
        let rolling = RollingWindow::new(config.risk.window, config.risk.tail_probability)?;
        Ok(Self::new(
            config.event_dates.clone(),
            config.build_portfolios()?,
            rolling,
            config.windows.spec(),
        ))
    }

    /// Disables the progress bar (for tests and non-interactive output).
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Processes every cell against `snapshot`.
    ///
    /// A failing cell is recorded and logged, never fatal: the error returned here
    /// only covers the progress display.
    pub fn run(&self, snapshot: &MarketSnapshot) -> Result<EventStudy, ProcessError> {
        let total = self.events.len() * self.portfolios.len();
        tracing::info!(
            events = self.events.len(),
            portfolios = self.portfolios.len(),
            window = self.rolling.length(),
            tail_probability = %self.rolling.tail_probability(),
            "Starting event-window study."
        );

        let progress_bar = if self.show_progress {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("=>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut cells = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for event in &self.events {
            for portfolio in &self.portfolios {
                progress_bar.set_message(format!("{event} {}", portfolio.name()));
                match self.process_cell(snapshot, *event, portfolio) {
                    Ok(cell) => {
                        tracing::debug!(
                            %event,
                            portfolio = portfolio.name(),
                            observations = cell.realized.len(),
                            worst_cvar = ?cell.worst_cvar.map(|(_, value)| value),
                            violations = cell.backtest.violations,
                            "Processed cell."
                        );
                        cells.push(cell);
                    }
                    Err(error) => {
                        tracing::warn!(
                            %event,
                            portfolio = portfolio.name(),
                            %error,
                            "Cell failed; continuing with the rest of the study."
                        );
                        failures.push(CellFailure {
                            event: *event,
                            portfolio: portfolio.name().to_string(),
                            error,
                        });
                    }
                }
                progress_bar.inc(1);
            }
        }

        progress_bar.finish_and_clear();
        tracing::info!(
            computed = cells.len(),
            failed = failures.len(),
            "Event-window study complete."
        );

        Ok(EventStudy {
            events: self.events.clone(),
            portfolios: self
                .portfolios
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            cells,
            failures,
        })
    }

    /// Computes one (event, portfolio) cell.
    pub fn process_cell(
        &self,
        snapshot: &MarketSnapshot,
        event: NaiveDate,
        portfolio: &Portfolio,
    ) -> Result<CellArtifacts, ProcessError> {
        // --- 1. Frame the event ---
        let window = EventWindow::around(event, &self.spec)?;

        // --- 2. Weights fixed at the window start, returns from the margin on ---
        let weights = snapshot.weights(portfolio, window.window_start)?;
        let weighted_returns = snapshot.weighted_returns(
            portfolio,
            &weights,
            window.margin_start,
            window.window_end,
        );
        let realized = weighted_returns.between(window.window_start, window.window_end);
        if realized.is_empty() {
            return Err(ProcessError::EmptyWindow {
                event,
                portfolio: portfolio.name().to_string(),
            });
        }

        // --- 3. Rolling estimates, kept inside the analysis window ---
        let risk = self.rolling.apply(&weighted_returns)?;
        let var = risk.var.between(window.window_start, window.window_end);
        let cvar = risk.cvar.between(window.window_start, window.window_end);

        // --- 4. Summary value and backtest ---
        let worst_cvar = cvar.min();
        let backtest = backtester::backtest(&realized, &var);

        Ok(CellArtifacts {
            event,
            portfolio: portfolio.name().to_string(),
            window,
            weights,
            weighted_returns,
            realized,
            var,
            cvar,
            worst_cvar,
            backtest,
        })
    }
}
