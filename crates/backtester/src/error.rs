use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Risk estimation error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Backtest period is invalid: {0}")]
    InvalidPeriod(String),
}
