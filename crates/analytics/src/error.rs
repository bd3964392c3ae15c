use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Initial capital must be positive, got {0}")]
    InvalidCapital(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
