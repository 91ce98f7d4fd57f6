use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Risk parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("Cannot estimate risk from an empty sample.")]
    EmptySample,

    #[error("A calculation error occurred: {0}")]
    Calculation(String),
}
