use crate::error::RiskError;
use crate::historical::HistoricalEstimator;
use crate::RiskEstimator;
use core_types::{DatedSeries, RiskSeries};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The VaR and CVaR series produced from the same sequence of windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingRisk {
    pub var: RiskSeries,
    pub cvar: RiskSeries,
}

/// A trailing window of fixed length, evaluated with a historical estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindow {
    length: usize,
    estimator: HistoricalEstimator,
}

impl RollingWindow {
    pub fn new(length: usize, tail_probability: Decimal) -> Result<Self, RiskError> {
        if length == 0 {
            return Err(RiskError::InvalidParameters(
                "rolling window length must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            length,
            estimator: HistoricalEstimator::new(tail_probability)?,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn tail_probability(&self) -> Decimal {
        self.estimator.tail_probability()
    }

    /// Evaluates every date of `returns` that closes a full window of `length`
    /// observations (the date itself included).
    ///
    /// The first `length - 1` dates have no value. A series shorter than the window
    /// yields empty output rather than an error.
    pub fn apply(&self, returns: &DatedSeries) -> Result<RollingRisk, RiskError> {
        let dates: Vec<_> = returns.dates().collect();
        let values: Vec<Decimal> = returns.values().collect();

        let mut risk = RollingRisk::default();
        for (offset, window) in values.windows(self.length).enumerate() {
            let date = dates[offset + self.length - 1];
            let (var, cvar) = self.estimator.estimate(window)?;
            risk.var.insert(date, var);
            risk.cvar.insert(date, cvar);
        }
        tracing::debug!(
            window = self.length,
            observations = values.len(),
            estimates = risk.var.len(),
            "Rolled VaR/CVaR."
        );
        Ok(risk)
    }
}

/// Rolling VaR and CVaR over `returns` in a single pass.
pub fn rolling_risk(
    returns: &DatedSeries,
    window: usize,
    tail_probability: Decimal,
) -> Result<RollingRisk, RiskError> {
    RollingWindow::new(window, tail_probability)?.apply(returns)
}

/// Rolling VaR over `returns`. See [`RollingWindow::apply`].
pub fn rolling_var(
    returns: &DatedSeries,
    window: usize,
    tail_probability: Decimal,
) -> Result<RiskSeries, RiskError> {
    Ok(rolling_risk(returns, window, tail_probability)?.var)
}

/// Rolling CVaR over `returns`. See [`RollingWindow::apply`].
pub fn rolling_cvar(
    returns: &DatedSeries,
    window: usize,
    tail_probability: Decimal,
) -> Result<RiskSeries, RiskError> {
    Ok(rolling_risk(returns, window, tail_probability)?.cvar)
}
