use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Price for {instrument} on {date} must be positive, got {price}")]
    NonPositivePrice {
        instrument: String,
        date: NaiveDate,
        price: Decimal,
    },

    #[error("Date arithmetic out of range: {0}")]
    DateOutOfRange(String),
}
