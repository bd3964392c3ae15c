use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A standardized report of a pairs backtest.
///
/// This struct is the final output of the `AnalyticsEngine` and is what the
/// report assembler renders into the metric table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    /// Sum of the P&L of every closed trade.
    pub net_profit: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub total_return_pct: Decimal,

    // II. Risk and Drawdown
    /// Sample std of per-period equity returns, annualized. A fraction, not a percentage.
    pub annualized_volatility: f64,
    pub max_drawdown_pct: Decimal,

    // III. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Option<Decimal>, // None with 0 trades

    // IV. Time-Based Metrics
    /// Mean calendar days between entry and exit.
    pub average_holding_days: Option<f64>,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    pub fn new() -> Self {
        Self {
            net_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            total_return_pct: Decimal::ZERO,
            annualized_volatility: 0.0,
            max_drawdown_pct: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: None,
            average_holding_days: None,
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
