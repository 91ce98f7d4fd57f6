use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessError {
    #[error("Invalid event window: {0}")]
    Window(#[from] core_types::CoreError),

    #[error("Data availability error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Risk estimation error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Portfolio '{portfolio}' has no tradable date in the window around {event}")]
    EmptyWindow { event: NaiveDate, portfolio: String },

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for ProcessError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        ProcessError::ProgressBarTemplate(error.to_string())
    }
}

impl From<configuration::ConfigError> for ProcessError {
    fn from(error: configuration::ConfigError) -> Self {
        ProcessError::Configuration(error.to_string())
    }
}
