use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Signal is misaligned with prices: {zscores} z-scores for {prices} prices")]
    Misaligned { prices: usize, zscores: usize },

    #[error("At least two prices are needed to backtest, got {0}")]
    NotEnoughData(usize),

    #[error("Numeric conversion failed: {0}")]
    Conversion(String),
}
