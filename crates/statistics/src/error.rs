use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatisticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Non-finite value encountered while computing {0}")]
    NonFinite(String),

    #[error("Input series have different lengths: {0} vs {1}")]
    LengthMismatch(usize, usize),
}
