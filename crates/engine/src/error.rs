use market_data::DataError;
use thiserror::Error;

/// The four ways an analysis request can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    DataUnavailable(String),

    #[error("{0}")]
    InsufficientHistory(String),

    #[error("Internal computation error: {0}")]
    InternalComputation(String),
}

impl AnalysisError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::DataUnavailable(_) => "data_unavailable",
            AnalysisError::InsufficientHistory(_) => "insufficient_history",
            AnalysisError::InternalComputation(_) => "internal_computation",
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(msg.into())
    }
}

impl From<DataError> for AnalysisError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::InsufficientHistory { .. } => {
                AnalysisError::InsufficientHistory(error.to_string())
            }
            DataError::ClientBuild(_) => AnalysisError::InternalComputation(error.to_string()),
            _ => AnalysisError::DataUnavailable(error.to_string()),
        }
    }
}

impl From<statistics::StatisticsError> for AnalysisError {
    fn from(error: statistics::StatisticsError) -> Self {
        AnalysisError::InternalComputation(error.to_string())
    }
}

impl From<strategies::StrategyError> for AnalysisError {
    fn from(error: strategies::StrategyError) -> Self {
        AnalysisError::InternalComputation(error.to_string())
    }
}

impl From<backtester::BacktestError> for AnalysisError {
    fn from(error: backtester::BacktestError) -> Self {
        AnalysisError::InternalComputation(error.to_string())
    }
}

impl From<reporting::ReportError> for AnalysisError {
    fn from(error: reporting::ReportError) -> Self {
        AnalysisError::InternalComputation(error.to_string())
    }
}
