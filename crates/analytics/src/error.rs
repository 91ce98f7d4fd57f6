use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No price for {instrument} at or before {as_of} (portfolio '{portfolio}')")]
    MissingPrice {
        portfolio: String,
        instrument: String,
        as_of: NaiveDate,
    },

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
