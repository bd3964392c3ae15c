//! Integration tests for the pair loader: retries, timeouts, fetch limits and alignment.

use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::DataSourceConfig;
use core_types::{PricePoint, PriceSeries};
use market_data::{DataError, MarketDataLoader, PriceSource, SyntheticSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wraps the synthetic source and counts every fetch per ticker.
#[derive(Default)]
struct CountingSource {
    inner: SyntheticSource,
    calls: std::sync::Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    fn calls(&self, ticker: &str) -> usize {
        self.calls.lock().unwrap().get(ticker).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PriceSource for CountingSource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        *self.calls.lock().unwrap().entry(ticker.to_string()).or_default() += 1;
        self.inner.fetch_daily(ticker, start, end).await
    }
}

/// Fails the first fetch with a transport error, then behaves.
#[derive(Default)]
struct FlakySource {
    inner: SyntheticSource,
    calls: AtomicUsize,
}

#[async_trait]
impl PriceSource for FlakySource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(DataError::Transport {
                ticker: ticker.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.inner.fetch_daily(ticker, start, end).await
    }
}

/// Never answers within any reasonable timeout.
#[derive(Default)]
struct StalledSource {
    calls: AtomicUsize,
}

#[async_trait]
impl PriceSource for StalledSource {
    async fn fetch_daily(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!("the loader times out first")
    }
}

/// Records the highest number of fetches observed in flight at once.
#[derive(Default)]
struct GaugedSource {
    inner: SyntheticSource,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl PriceSource for GaugedSource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.fetch_daily(ticker, start, end).await
    }
}

/// Serves fixed series, keyed by ticker.
struct FixedSource(HashMap<String, Vec<PricePoint>>);

#[async_trait]
impl PriceSource for FixedSource {
    async fn fetch_daily(
        &self,
        ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let points = self.0.get(ticker).cloned().unwrap_or_default();
        Ok(PriceSeries::new(ticker, points).unwrap())
    }
}

#[tokio::test]
async fn loads_aligned_pair() {
    let loader = MarketDataLoader::new(Arc::new(SyntheticSource::new()), &DataSourceConfig::default());

    let aligned = loader
        .load_pair("NVDA", "AMD", date(2023, 1, 1), date(2024, 1, 1))
        .await
        .unwrap();

    assert!(aligned.len() > 250);
    assert_eq!(aligned.prices1.len(), aligned.len());
    assert_eq!(aligned.prices2.len(), aligned.len());
    assert_eq!(aligned.ticker1, "NVDA");
    assert_eq!(aligned.ticker2, "AMD");
}

#[tokio::test]
async fn unknown_ticker_is_retried_once_then_surfaced() {
    let source = Arc::new(CountingSource::default());
    let loader = MarketDataLoader::new(source.clone(), &DataSourceConfig::default());

    let err = loader
        .load_series("ZZZZZZ9", date(2023, 1, 1), date(2024, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::NotFound { .. }));
    assert_eq!(source.calls("ZZZZZZ9"), 2);
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let source = Arc::new(FlakySource::default());
    let loader = MarketDataLoader::new(source.clone(), &DataSourceConfig::default());

    let series = loader
        .load_series("AMD", date(2023, 1, 1), date(2023, 3, 1))
        .await
        .unwrap();

    assert!(!series.is_empty());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stalled_source_times_out() {
    let source = Arc::new(StalledSource::default());
    let loader = MarketDataLoader::new(source.clone(), &DataSourceConfig::default());

    let err = loader
        .load_series("NVDA", date(2023, 1, 1), date(2024, 1, 1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DataError::Timeout {
            ticker: "NVDA".to_string(),
            secs: 10
        }
    );
    assert!(err.to_string().contains("no data"));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn fetches_are_bounded_across_callers() {
    let source = Arc::new(GaugedSource::default());
    let config = DataSourceConfig {
        max_concurrent_fetches: 2,
        ..DataSourceConfig::default()
    };
    let loader = MarketDataLoader::new(source.clone(), &config);

    let tickers = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"];
    let results = futures::future::join_all(
        tickers
            .iter()
            .map(|t| loader.load_series(t, date(2023, 1, 1), date(2023, 2, 1))),
    )
    .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(source.peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn sparse_overlap_is_insufficient_history() {
    let day = |d: u32| date(2024, 3, d);
    let mut data = HashMap::new();
    data.insert(
        "AAA".to_string(),
        (1..=10).map(|d| PricePoint::new(day(d), 10.0 + d as f64)).collect(),
    );
    // Only days 9 and 10 overlap.
    data.insert(
        "BBB".to_string(),
        (9..=20).map(|d| PricePoint::new(day(d), 50.0 + d as f64)).collect(),
    );
    let loader = MarketDataLoader::new(Arc::new(FixedSource(data)), &DataSourceConfig::default());

    let err = loader
        .load_pair("AAA", "BBB", day(1), day(21))
        .await
        .unwrap_err();

    assert_eq!(err, DataError::InsufficientHistory { found: 2, required: 5 });
}
