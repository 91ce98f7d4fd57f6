use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The data provider returned an error for {ticker}: {message}")]
    Provider { ticker: String, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format: {0}")]
    InvalidData(String),

    #[error("Ticker {0} is not present in the price snapshot")]
    UnknownTicker(String),

    #[error("Failed to read or write the price snapshot: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on the price snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rejected price observation: {0}")]
    Core(#[from] core_types::CoreError),
}
