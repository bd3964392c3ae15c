use backtester::{BacktestError, Backtester};
use chrono::NaiveDate;
use configuration::BacktestParams;
use core_types::{AlignedPrices, PositionState, SpreadDirection};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strategies::ZScoreReversion;

fn aligned(prices1: &[f64], prices2: &[f64]) -> AlignedPrices {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
    AlignedPrices {
        ticker1: "NVDA".to_string(),
        ticker2: "AMD".to_string(),
        dates: (0..prices1.len() as i64)
            .map(|d| start + chrono::Duration::days(d))
            .collect(),
        prices1: prices1.to_vec(),
        prices2: prices2.to_vec(),
    }
}

fn backtester() -> Backtester {
    let params = BacktestParams::default();
    let strategy = ZScoreReversion::new(&params).unwrap();
    Backtester::new(Box::new(strategy), params)
}

#[test]
fn enters_on_stretch_and_exits_on_reversion() {
    let prices = aligned(
        &[100.0, 100.0, 100.0, 110.0, 90.0, 95.0],
        &[50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
    );
    let zscores = [None, Some(2.5), Some(1.0), Some(0.3), Some(0.0)];

    let result = backtester().run(&prices, &zscores, dec!(1000)).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, SpreadDirection::ShortFirstLongSecond);
    assert_eq!((trade.entry_index, trade.exit_index), (2, 4));
    assert_eq!(trade.leg_notional, dec!(500));
    // Short leg: 500 * (1 - 90/100).
    assert_eq!(trade.pnl, dec!(50));
    assert_eq!(result.report.net_profit, dec!(50));

    let equity: Vec<Decimal> = result.snapshots.iter().map(|s| s.equity).collect();
    assert_eq!(
        equity,
        vec![dec!(1000), dec!(1000), dec!(1000), dec!(950), dec!(1050), dec!(1050)]
    );
    assert_eq!(
        result.snapshots[3].position,
        PositionState::LongShort(SpreadDirection::ShortFirstLongSecond)
    );
    assert!(result.snapshots[4].position.is_flat());
}

#[test]
fn open_position_is_closed_on_the_last_day() {
    let prices = aligned(&[100.0, 98.0, 95.0, 97.0, 99.0], &[50.0, 50.0, 50.0, 50.0, 49.0]);
    let zscores = [None, Some(-3.0), Some(-2.5), Some(-2.4)];

    let result = backtester().run(&prices, &zscores, dec!(1000)).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, SpreadDirection::LongFirstShortSecond);
    assert_eq!((trade.entry_index, trade.exit_index), (2, 4));
    assert_eq!(result.snapshots.last().unwrap().equity, dec!(1000) + result.report.net_profit);
    assert!(result.snapshots.last().unwrap().position.is_flat());
}

#[test]
fn no_signal_means_no_trades() {
    let prices = aligned(&[10.0, 11.0, 12.0, 11.5], &[20.0, 19.0, 21.0, 22.0]);
    // A stretch on the final day is not enough to enter.
    let zscores = [None, None, Some(3.0)];

    let result = backtester().run(&prices, &zscores, dec!(1000)).unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.report.net_profit, Decimal::ZERO);
    assert_eq!(result.report.total_trades, 0);
    assert!(result.snapshots.iter().all(|s| s.equity == dec!(1000)));
    assert_eq!(result.snapshots.len(), prices.len());
}

#[test]
fn short_squeeze_below_zero_equity_still_reports() {
    // The shorted first leg more than triples while the second stays flat.
    let prices = aligned(&[100.0, 100.0, 320.0, 330.0], &[50.0, 50.0, 50.0, 50.0]);
    let zscores = [Some(3.0), Some(2.5), Some(2.5)];

    let result = backtester().run(&prices, &zscores, dec!(1000)).unwrap();

    let equity: Vec<Decimal> = result.snapshots.iter().map(|s| s.equity).collect();
    assert_eq!(equity, vec![dec!(1000), dec!(1000), dec!(-100), dec!(-150)]);
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.report.net_profit, dec!(-1150));
    assert_eq!(result.report.losing_trades, 1);
    assert_eq!(result.report.max_drawdown_pct, dec!(115));
    assert!(result.report.annualized_volatility.is_finite());
}

#[test]
fn vanishing_prices_are_a_conversion_error() {
    let prices = aligned(&[1e-30, 1e-30, 2e-30], &[50.0, 50.0, 50.0]);
    let err = backtester().run(&prices, &[Some(3.0), Some(0.0)], dec!(1000)).unwrap_err();
    assert!(matches!(err, BacktestError::Conversion(_)));
}

#[test]
fn rejects_misaligned_signal() {
    let prices = aligned(&[10.0, 11.0, 12.0], &[20.0, 19.0, 21.0]);
    let err = backtester().run(&prices, &[None], dec!(1000)).unwrap_err();
    assert_eq!(err, BacktestError::Misaligned { prices: 3, zscores: 1 });
}

fn scenario() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Vec<Option<f64>>)> {
    (10usize..120).prop_flat_map(|n| {
        (
            proptest::collection::vec(-0.02f64..0.02, n),
            proptest::collection::vec(-0.02f64..0.02, n),
            proptest::collection::vec(proptest::option::weighted(0.9, -4.0f64..4.0), n - 1),
        )
            .prop_map(|(r1, r2, zscores)| {
                let walk = |returns: &[f64], start: f64| {
                    returns
                        .iter()
                        .scan(start, |price, r| {
                            *price *= 1.0 + r;
                            Some(*price)
                        })
                        .collect::<Vec<f64>>()
                };
                (walk(&r1, 100.0), walk(&r2, 40.0), zscores)
            })
    })
}

proptest! {
    #[test]
    fn trade_pnl_sums_to_net_profit((p1, p2, zscores) in scenario()) {
        let prices = aligned(&p1, &p2);
        let result = backtester().run(&prices, &zscores, dec!(10000)).unwrap();

        let summed: Decimal = result.trades.iter().map(|t| t.pnl).sum();
        prop_assert_eq!(summed, result.report.net_profit);
        prop_assert_eq!(result.snapshots.len(), prices.len());
        prop_assert_eq!(
            result.snapshots.last().unwrap().equity,
            dec!(10000) + result.report.net_profit
        );
        for trade in &result.trades {
            prop_assert!(trade.entry_index < trade.exit_index);
        }
    }
}
