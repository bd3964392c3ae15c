use crate::PriceSource;
use crate::error::DataError;
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use core_types::{PricePoint, PriceSeries};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tickers with this prefix behave like symbols the source has never listed.
pub const UNKNOWN_TICKER_PREFIX: &str = "ZZZ";

const MARKET_SEED: u64 = 0x5eed_0f_ba5e;
const MARKET_VOL: f64 = 0.012;
const IDIOSYNCRATIC_VOL: f64 = 0.009;

/// A deterministic, offline price source.
///
/// Each ticker is a geometric random walk driven by a shared market factor plus
/// its own noise, generated business day by business day from a fixed anchor
/// date. The same ticker and date always give the same price, whatever range
/// is requested, so overlapping requests line up exactly.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    anchor: NaiveDate,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            anchor: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN),
        }
    }

    /// Generates the business-day series for `[start, end)`.
    pub fn generate(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let seed = ticker_seed(ticker);
        let mut market = StdRng::seed_from_u64(MARKET_SEED);
        let mut own = StdRng::seed_from_u64(seed);

        // Ticker-specific exposure to the market factor, in [0.6, 1.4).
        let beta = 0.6 + (seed % 800) as f64 / 1000.0;
        let drift = ((seed >> 10) % 7) as f64 * 0.0001;
        let mut price = 20.0 + (seed % 180) as f64;

        let mut points = Vec::new();
        let mut day = self.anchor;
        while day < end {
            if is_business_day(day) {
                let market_shock = market.gen_range(-1.0_f64..1.0) * MARKET_VOL * 3f64.sqrt();
                let own_shock = own.gen_range(-1.0_f64..1.0) * IDIOSYNCRATIC_VOL * 3f64.sqrt();
                price *= (drift + beta * market_shock + own_shock).exp();

                if day >= start {
                    points.push(PricePoint::new(day, price));
                }
            }
            day += Duration::days(1);
        }

        points
    }
}

#[async_trait]
impl PriceSource for SyntheticSource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if ticker.starts_with(UNKNOWN_TICKER_PREFIX) {
            return Err(DataError::NotFound {
                ticker: ticker.to_string(),
                reason: "symbol may be delisted".to_string(),
            });
        }

        let points = self.generate(ticker, start, end);
        if points.is_empty() {
            return Err(DataError::NotFound {
                ticker: ticker.to_string(),
                reason: "no trading days in the requested range".to_string(),
            });
        }

        PriceSeries::new(ticker, points).map_err(|e| DataError::InvalidData {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })
    }
}

fn is_business_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// FNV-1a over the ticker bytes.
fn ticker_seed(ticker: &str) -> u64 {
    ticker.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overlapping_ranges_agree() {
        let source = SyntheticSource::new();
        let wide = source.generate("NVDA", date(2023, 1, 1), date(2024, 1, 1));
        let narrow = source.generate("NVDA", date(2023, 6, 1), date(2023, 7, 1));

        let offset = wide.iter().position(|p| p.date == narrow[0].date).unwrap();
        assert_eq!(&wide[offset..offset + narrow.len()], narrow.as_slice());
    }

    #[test]
    fn skips_weekends_and_excludes_end_date() {
        let source = SyntheticSource::new();
        // 2024-01-06 and 2024-01-07 are a weekend.
        let points = source.generate("AMD", date(2024, 1, 5), date(2024, 1, 9));
        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 5), date(2024, 1, 8)]);
    }

    #[test]
    fn different_tickers_differ() {
        let source = SyntheticSource::new();
        let a = source.generate("NVDA", date(2023, 1, 1), date(2023, 2, 1));
        let b = source.generate("AMD", date(2023, 1, 1), date(2023, 2, 1));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn unknown_prefix_is_not_found() {
        let err = SyntheticSource::new()
            .fetch_daily("ZZZZZZ9", date(2023, 1, 1), date(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }
}
