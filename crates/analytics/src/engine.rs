use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use chrono::NaiveDate;
use core_types::PairTrade;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// A stateless calculator for deriving performance metrics from a backtest.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - All closed `PairTrade`s of the backtest.
    /// * `equity_curve` - Portfolio value at every price index.
    /// * `initial_capital` - The starting capital of the backtest.
    /// * `periods_per_year` - Used to annualize the equity-return volatility.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        trades: &[PairTrade],
        equity_curve: &[(NaiveDate, Decimal)],
        initial_capital: Decimal,
        periods_per_year: u32,
    ) -> Result<PerformanceReport, AnalyticsError> {
        if initial_capital <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidCapital(initial_capital.to_string()));
        }

        let mut report = PerformanceReport::new();

        // Risk metrics come from the equity curve, so they exist even without trades.
        self.calculate_drawdown(equity_curve, &mut report);
        self.calculate_volatility(equity_curve, initial_capital, periods_per_year, &mut report)?;

        if !trades.is_empty() {
            self.calculate_profitability(trades, initial_capital, &mut report);
            self.calculate_time_metrics(trades, &mut report);
        }

        tracing::debug!(
            trades = report.total_trades,
            net_profit = %report.net_profit,
            max_drawdown_pct = %report.max_drawdown_pct,
            "Performance metrics calculated."
        );
        Ok(report)
    }

    /// Calculates all profitability-related metrics.
    fn calculate_profitability(
        &self,
        trades: &[PairTrade],
        initial_capital: Decimal,
        report: &mut PerformanceReport,
    ) {
        report.total_trades = trades.len();

        for trade in trades {
            report.net_profit += trade.pnl;

            if trade.is_winner() {
                report.gross_profit += trade.pnl;
                report.winning_trades += 1;
            } else {
                report.gross_loss += trade.pnl.abs();
                report.losing_trades += 1;
            }
        }

        report.win_rate_pct = Some(
            Decimal::from(report.winning_trades) / Decimal::from(report.total_trades)
                * Decimal::ONE_HUNDRED,
        );
        report.total_return_pct = report.net_profit / initial_capital * Decimal::ONE_HUNDRED;
    }

    /// Largest peak-to-trough fall of the equity curve, relative to the peak.
    /// Points where the running peak is not positive are skipped.
    fn calculate_drawdown(&self, equity_curve: &[(NaiveDate, Decimal)], report: &mut PerformanceReport) {
        let Some(&(_, first)) = equity_curve.first() else {
            return;
        };

        let mut peak_equity = first;
        let mut max_drawdown_pct = Decimal::ZERO;

        for &(_date, equity) in equity_curve {
            if equity > peak_equity {
                peak_equity = equity;
            }
            if peak_equity <= Decimal::ZERO {
                continue;
            }
            let drawdown_pct = (peak_equity - equity) / peak_equity * Decimal::ONE_HUNDRED;
            if drawdown_pct > max_drawdown_pct {
                max_drawdown_pct = drawdown_pct;
            }
        }

        report.max_drawdown_pct = max_drawdown_pct;
    }

    /// Sample standard deviation of per-period equity changes over the initial
    /// capital, scaled by `sqrt(periods_per_year)`. Zero when fewer than two
    /// returns exist. Equity may reach zero or below without breaking this.
    fn calculate_volatility(
        &self,
        equity_curve: &[(NaiveDate, Decimal)],
        initial_capital: Decimal,
        periods_per_year: u32,
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        let returns = equity_curve
            .windows(2)
            .map(|w| {
                ((w[1].1 - w[0].1) / initial_capital).to_f64().ok_or_else(|| {
                    AnalyticsError::Calculation("equity return does not fit in f64".to_string())
                })
            })
            .collect::<Result<Vec<f64>, AnalyticsError>>()?;

        if returns.len() < 2 {
            report.annualized_volatility = 0.0;
            return Ok(());
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let volatility = variance.sqrt() * f64::from(periods_per_year).sqrt();

        if !volatility.is_finite() {
            return Err(AnalyticsError::Calculation(
                "annualized volatility is not finite".to_string(),
            ));
        }

        report.annualized_volatility = volatility;
        Ok(())
    }

    /// Calculates time-based metrics.
    fn calculate_time_metrics(&self, trades: &[PairTrade], report: &mut PerformanceReport) {
        let total_days: i64 = trades.iter().map(PairTrade::holding_days).sum();
        report.average_holding_days = Some(total_days as f64 / trades.len() as f64);
    }
}
