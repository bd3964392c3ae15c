use crate::error::ReportError;
use backtester::BacktestResult;
use core_types::{AlignedPrices, AnalysisRequest};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use statistics::PairStatistics;

/// Metric names in the order they are reported.
pub const METRIC_KEYS: [&str; 8] = [
    "Outperformer",
    "Underperformer",
    "Net Profit",
    "Annualized Volatility",
    "Total Trades",
    "Win Rate",
    "Max Drawdown",
    "Return Correlation",
];

/// Extra backtest detail shown in the CLI table and the exported files.
pub const DETAIL_KEYS: [&str; 8] = [
    "Outperformer Return",
    "Underperformer Return",
    "Total Return",
    "Gross Profit",
    "Gross Loss",
    "Winning Trades",
    "Losing Trades",
    "Average Holding Period",
];

/// One line of the metric table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl MetricRow {
    pub fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
        }
    }
}

/// A ticker and its buy-and-hold return over the aligned period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performer {
    pub ticker: String,
    pub total_return: f64,
}

/// Every number computed for one request. Both the JSON summary and the
/// exported file are rendered from this value.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    pub prices: AlignedPrices,
    pub statistics: PairStatistics,
    pub backtest: BacktestResult,
    pub outperformer: Performer,
    pub underperformer: Performer,
}

impl AnalysisReport {
    pub fn assemble(
        request: AnalysisRequest,
        prices: AlignedPrices,
        statistics: PairStatistics,
        backtest: BacktestResult,
    ) -> Result<Self, ReportError> {
        if statistics.returns.len() + 1 != prices.len() {
            return Err(ReportError::Misaligned(format!(
                "{} returns for {} prices",
                statistics.returns.len(),
                prices.len()
            )));
        }
        if statistics.zscores.len() != statistics.returns.len() {
            return Err(ReportError::Misaligned(format!(
                "{} z-scores for {} returns",
                statistics.zscores.len(),
                statistics.returns.len()
            )));
        }
        if backtest.snapshots.len() != prices.len() {
            return Err(ReportError::Misaligned(format!(
                "{} snapshots for {} prices",
                backtest.snapshots.len(),
                prices.len()
            )));
        }

        let (r1, r2) = prices.total_returns();
        let first = Performer {
            ticker: prices.ticker1.clone(),
            total_return: r1,
        };
        let second = Performer {
            ticker: prices.ticker2.clone(),
            total_return: r2,
        };
        // Ties go to the first ticker.
        let (outperformer, underperformer) = if r1 >= r2 { (first, second) } else { (second, first) };

        Ok(Self {
            request,
            prices,
            statistics,
            backtest,
            outperformer,
            underperformer,
        })
    }

    /// The metric table, always in `METRIC_KEYS` order.
    pub fn metrics(&self) -> Vec<MetricRow> {
        let report = &self.backtest.report;
        let values = [
            self.outperformer.ticker.clone(),
            self.underperformer.ticker.clone(),
            format_decimal(report.net_profit),
            format_percent(report.annualized_volatility * 100.0),
            report.total_trades.to_string(),
            report
                .win_rate_pct
                .map(|rate| format!("{}%", format_decimal(rate)))
                .unwrap_or_else(|| "N/A".to_string()),
            format!("{}%", format_decimal(report.max_drawdown_pct)),
            self.statistics
                .correlation
                .filter(|rho| rho.is_finite())
                .map(|rho| format!("{rho:.2}"))
                .unwrap_or_else(|| "N/A".to_string()),
        ];

        METRIC_KEYS
            .iter()
            .zip(values)
            .map(|(key, value)| MetricRow::new(*key, value))
            .collect()
    }

    /// The rows after the summary metrics, always in `DETAIL_KEYS` order.
    pub fn detail_metrics(&self) -> Vec<MetricRow> {
        let report = &self.backtest.report;
        let values = [
            format_percent(self.outperformer.total_return * 100.0),
            format_percent(self.underperformer.total_return * 100.0),
            format!("{}%", format_decimal(report.total_return_pct)),
            format_decimal(report.gross_profit),
            format_decimal(report.gross_loss),
            report.winning_trades.to_string(),
            report.losing_trades.to_string(),
            report
                .average_holding_days
                .filter(|days| days.is_finite())
                .map(|days| format!("{days:.1} days"))
                .unwrap_or_else(|| "N/A".to_string()),
        ];

        DETAIL_KEYS
            .iter()
            .zip(values)
            .map(|(key, value)| MetricRow::new(*key, value))
            .collect()
    }

    /// "NVDA vs AMD".
    pub fn pair_label(&self) -> String {
        format!("{} vs {}", self.prices.ticker1, self.prices.ticker2)
    }
}

/// Two decimal places, half away from zero, never "-0.00".
pub(crate) fn format_decimal(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{rounded:.2}")
}

fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        "N/A".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_is_rounded_half_away_from_zero() {
        assert_eq!(format_decimal(dec!(12.345)), "12.35");
        assert_eq!(format_decimal(dec!(-12.345)), "-12.35");
        assert_eq!(format_decimal(dec!(7)), "7.00");
        assert_eq!(format_decimal(dec!(-0.001)), "0.00");
    }

    #[test]
    fn percent_of_non_finite_is_not_available() {
        assert_eq!(format_percent(12.3456), "12.35%");
        assert_eq!(format_percent(f64::NAN), "N/A");
    }
}
