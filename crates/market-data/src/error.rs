use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("no data found for ticker {ticker}: {reason}")]
    NotFound { ticker: String, reason: String },

    #[error("no data: price source unreachable for {ticker}: {reason}")]
    Transport { ticker: String, reason: String },

    #[error("no data: fetching {ticker} timed out after {secs}s")]
    Timeout { ticker: String, secs: u64 },

    #[error("no data: invalid price data for {ticker}: {reason}")]
    InvalidData { ticker: String, reason: String },

    #[error("Failed to build the HTTP client: {0}")]
    ClientBuild(String),

    #[error("Not enough historical rows ({found} aligned trading days, at least {required} needed); widen the date range.")]
    InsufficientHistory { found: usize, required: usize },
}
