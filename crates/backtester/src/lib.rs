use analytics::{AnalyticsEngine, PerformanceReport};
use chrono::NaiveDate;
use configuration::BacktestParams;
use core_types::{AlignedPrices, PairTrade, PositionState, SpreadDirection};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use strategies::{Signal, SpreadObservation, Strategy};

pub mod error;

pub use error::BacktestError;

/// Decimal places kept on every trade P&L.
const PNL_SCALE: u32 = 8;

/// The portfolio at the close of one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    /// `None` on the first day, which has no return, and while the lookback fills.
    pub zscore: Option<f64>,
    pub position: PositionState,
    pub equity: Decimal,
}

/// Everything a backtest run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// One entry per price index.
    pub snapshots: Vec<Snapshot>,
    pub trades: Vec<PairTrade>,
    pub report: PerformanceReport,
}

/// A position that has been entered but not yet closed.
struct OpenTrade {
    direction: SpreadDirection,
    entry_index: usize,
    entry_prices: (f64, f64),
    entry_decimals: (Decimal, Decimal),
}

/// The pairs backtesting engine.
///
/// Walks the z-score one return at a time, asks the strategy what to do and
/// fills every entry and exit at the close of the day the signal is seen.
pub struct Backtester {
    strategy: Box<dyn Strategy>,
    params: BacktestParams,
    analytics_engine: AnalyticsEngine,
}

impl Backtester {
    pub fn new(strategy: Box<dyn Strategy>, params: BacktestParams) -> Self {
        Self {
            strategy,
            params,
            analytics_engine: AnalyticsEngine::new(),
        }
    }

    /// Runs the simulation.
    ///
    /// `zscores[t]` belongs to the return ending at price index `t + 1`, so it
    /// must be exactly one shorter than the price series.
    pub fn run(
        &mut self,
        prices: &AlignedPrices,
        zscores: &[Option<f64>],
        initial_capital: Decimal,
    ) -> Result<BacktestResult, BacktestError> {
        if prices.len() < 2 {
            return Err(BacktestError::NotEnoughData(prices.len()));
        }
        if zscores.len() + 1 != prices.len()
            || prices.prices1.len() != prices.len()
            || prices.prices2.len() != prices.len()
        {
            return Err(BacktestError::Misaligned {
                prices: prices.len(),
                zscores: zscores.len(),
            });
        }

        let allocation = Decimal::from_f64(self.params.leg_allocation).ok_or_else(|| {
            BacktestError::Conversion(format!("leg allocation {}", self.params.leg_allocation))
        })?;
        let leg_notional = initial_capital * allocation;

        let mut snapshots = Vec::with_capacity(prices.len());
        let mut trades = Vec::new();
        let mut state = PositionState::Flat;
        let mut open: Option<OpenTrade> = None;
        let mut realized = Decimal::ZERO;

        snapshots.push(Snapshot {
            date: prices.dates[0],
            zscore: None,
            position: state,
            equity: initial_capital,
        });

        let last = zscores.len() - 1;
        for (t, &zscore) in zscores.iter().enumerate() {
            let p = t + 1;
            let observation = SpreadObservation {
                index: t,
                date: prices.dates[p],
                zscore,
                is_last: t == last,
            };

            match self.strategy.evaluate(&observation, state)? {
                Some(Signal::Enter(direction)) if open.is_none() => {
                    open = Some(OpenTrade {
                        direction,
                        entry_index: p,
                        entry_prices: (prices.prices1[p], prices.prices2[p]),
                        entry_decimals: price_pair(prices, p)?,
                    });
                    state = PositionState::LongShort(direction);
                }
                Some(Signal::Exit(reason)) => {
                    if let Some(entry) = open.take() {
                        let exit_decimals = price_pair(prices, p)?;
                        let pnl = pair_pnl(entry.direction, leg_notional, entry.entry_decimals, exit_decimals)?;
                        realized += pnl;

                        tracing::debug!(
                            entry = %prices.dates[entry.entry_index],
                            exit = %prices.dates[p],
                            direction = entry.direction.label(),
                            ?reason,
                            %pnl,
                            "Closed pair trade."
                        );

                        trades.push(PairTrade {
                            direction: entry.direction,
                            entry_index: entry.entry_index,
                            exit_index: p,
                            entry_date: prices.dates[entry.entry_index],
                            exit_date: prices.dates[p],
                            entry_prices: entry.entry_prices,
                            exit_prices: (prices.prices1[p], prices.prices2[p]),
                            leg_notional,
                            pnl,
                        });
                    }
                    state = PositionState::Flat;
                }
                _ => {}
            }

            let unrealized = match &open {
                Some(entry) => {
                    pair_pnl(entry.direction, leg_notional, entry.entry_decimals, price_pair(prices, p)?)?
                }
                None => Decimal::ZERO,
            };

            snapshots.push(Snapshot {
                date: prices.dates[p],
                zscore,
                position: state,
                equity: initial_capital + realized + unrealized,
            });
        }

        let equity_curve: Vec<(NaiveDate, Decimal)> =
            snapshots.iter().map(|s| (s.date, s.equity)).collect();
        let report = self.analytics_engine.calculate(
            &trades,
            &equity_curve,
            initial_capital,
            self.params.periods_per_year,
        )?;

        tracing::debug!(
            trades = trades.len(),
            net_profit = %report.net_profit,
            "Backtest complete."
        );

        Ok(BacktestResult {
            snapshots,
            trades,
            report,
        })
    }
}

/// Both prices at `index` as decimals. A price too small to survive the
/// conversion is rejected, since it would later be divided by.
fn price_pair(prices: &AlignedPrices, index: usize) -> Result<(Decimal, Decimal), BacktestError> {
    let convert = |price: f64| {
        Decimal::from_f64(price)
            .filter(|d| *d > Decimal::ZERO)
            .ok_or_else(|| BacktestError::Conversion(format!("price {price}")))
    };
    Ok((convert(prices.prices1[index])?, convert(prices.prices2[index])?))
}

/// P&L of an equal-notional long/short pair between two sets of prices.
fn pair_pnl(
    direction: SpreadDirection,
    leg_notional: Decimal,
    entry: (Decimal, Decimal),
    exit: (Decimal, Decimal),
) -> Result<Decimal, BacktestError> {
    let leg = |entry: Decimal, exit: Decimal| {
        exit.checked_div(entry)
            .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
            .and_then(|change| change.checked_mul(leg_notional))
            .ok_or_else(|| BacktestError::Conversion(format!("leg return {entry} -> {exit}")))
    };
    let first = leg(entry.0, exit.0)?;
    let second = leg(entry.1, exit.1)?;
    let pnl = match direction {
        SpreadDirection::LongFirstShortSecond => first - second,
        SpreadDirection::ShortFirstLongSecond => second - first,
    };
    Ok(pnl.round_dp(PNL_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn long_leg_gain_and_short_leg_gain_add_up() {
        let pnl = pair_pnl(
            SpreadDirection::LongFirstShortSecond,
            dec!(500),
            (dec!(100), dec!(50)),
            (dec!(110), dec!(45)),
        )
        .unwrap();
        // +10% on the long leg, -10% on the shorted leg.
        assert_eq!(pnl, dec!(100));
    }

    #[test]
    fn direction_flips_the_sign() {
        let entry = (dec!(100), dec!(50));
        let exit = (dec!(104), dec!(51));
        let long_first = pair_pnl(SpreadDirection::LongFirstShortSecond, dec!(500), entry, exit).unwrap();
        let short_first = pair_pnl(SpreadDirection::ShortFirstLongSecond, dec!(500), entry, exit).unwrap();
        assert_eq!(long_first, dec!(10));
        assert_eq!(short_first, -long_first);
    }

    #[test]
    fn prices_lost_in_conversion_are_rejected() {
        let prices = AlignedPrices {
            ticker1: "NVDA".to_string(),
            ticker2: "AMD".to_string(),
            dates: vec![NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()],
            prices1: vec![1e-30],
            prices2: vec![50.0],
        };
        assert!(matches!(price_pair(&prices, 0), Err(BacktestError::Conversion(_))));
    }
}
