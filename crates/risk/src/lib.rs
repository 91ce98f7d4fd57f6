//! # Stressvar Risk
//!
//! Empirical Value-at-Risk and Conditional Value-at-Risk over rolling windows.
//!
//! Values are signed returns: a VaR of `-0.03` means the worst 5% of days lost at
//! least 3%. "More severe" therefore means "more negative".

pub mod error;
pub mod historical;
pub mod rolling;

use rust_decimal::Decimal;

pub use error::RiskError;
pub use historical::HistoricalEstimator;
pub use rolling::{RollingRisk, RollingWindow, rolling_cvar, rolling_risk, rolling_var};

/// Estimates tail risk from one window of returns.
///
/// The rolling machinery is written against this trait so that a parametric
/// estimator could be dropped in without touching the event processor.
pub trait RiskEstimator: Send + Sync {
    /// The tail quantile of `window`.
    fn value_at_risk(&self, window: &[Decimal]) -> Result<Decimal, RiskError>;

    /// The mean of the observations in `window` at or below its VaR.
    fn conditional_value_at_risk(&self, window: &[Decimal]) -> Result<Decimal, RiskError>;

    /// Both measures for the same window; implementations may share the work.
    fn estimate(&self, window: &[Decimal]) -> Result<(Decimal, Decimal), RiskError> {
        Ok((
            self.value_at_risk(window)?,
            self.conditional_value_at_risk(window)?,
        ))
    }
}
