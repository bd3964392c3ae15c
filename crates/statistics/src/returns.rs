use crate::error::StatisticsError;
use chrono::NaiveDate;
use core_types::AlignedPrices;
use serde::Serialize;

/// Simple daily returns of both tickers of a pair.
///
/// Entry `t` is the return from price `t` to price `t + 1` and carries the date
/// of price `t + 1`, so every vector is one shorter than the price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReturns {
    pub dates: Vec<NaiveDate>,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

impl PairReturns {
    pub fn from_prices(prices: &AlignedPrices) -> Result<Self, StatisticsError> {
        if prices.prices1.len() != prices.prices2.len() {
            return Err(StatisticsError::LengthMismatch(
                prices.prices1.len(),
                prices.prices2.len(),
            ));
        }
        if prices.len() < 2 {
            return Err(StatisticsError::NotEnoughData(format!(
                "{} aligned prices, at least 2 are needed for a return",
                prices.len()
            )));
        }

        let first = simple_returns(&prices.prices1);
        let second = simple_returns(&prices.prices2);
        if first.iter().chain(&second).any(|r| !r.is_finite()) {
            return Err(StatisticsError::NonFinite("returns".to_string()));
        }

        Ok(Self {
            dates: prices.dates[1..].to_vec(),
            first,
            second,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The return differential `r1 - r2`, the signal the z-score standardizes.
    pub fn spread(&self) -> Vec<f64> {
        self.first
            .iter()
            .zip(&self.second)
            .map(|(a, b)| a - b)
            .collect()
    }
}

/// `P_t / P_{t-1} - 1` for every consecutive pair of prices.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned(p1: Vec<f64>, p2: Vec<f64>) -> AlignedPrices {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        AlignedPrices {
            ticker1: "AAA".to_string(),
            ticker2: "BBB".to_string(),
            dates: (0..p1.len() as i64)
                .map(|d| start + chrono::Duration::days(d))
                .collect(),
            prices1: p1,
            prices2: p2,
        }
    }

    #[test]
    fn returns_are_one_shorter_and_dated_by_the_later_price() {
        let prices = aligned(vec![100.0, 110.0, 99.0], vec![50.0, 50.0, 55.0]);
        let returns = PairReturns::from_prices(&prices).unwrap();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns.dates, prices.dates[1..].to_vec());
        assert!((returns.first[0] - 0.1).abs() < 1e-12);
        assert!((returns.first[1] + 0.1).abs() < 1e-12);
        assert_eq!(returns.second[0], 0.0);
        assert!((returns.spread()[1] - (-0.1 - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn single_price_is_not_enough() {
        let prices = aligned(vec![100.0], vec![50.0]);
        assert!(matches!(
            PairReturns::from_prices(&prices),
            Err(StatisticsError::NotEnoughData(_))
        ));
    }
}
