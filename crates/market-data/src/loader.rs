use crate::PriceSource;
use crate::error::DataError;
use crate::synthetic::SyntheticSource;
use crate::yahoo::YahooClient;
use chrono::NaiveDate;
use configuration::{DataProvider, DataSourceConfig};
use core_types::{AlignedPrices, PriceSeries};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Loads and aligns the price history of a ticker pair.
///
/// One loader is shared by every request. Its semaphore is the only
/// coordination between requests: it caps how many fetches hit the price
/// source at the same time.
#[derive(Clone)]
pub struct MarketDataLoader {
    source: Arc<dyn PriceSource>,
    permits: Arc<Semaphore>,
    fetch_timeout: Duration,
    retries: u32,
    min_history: usize,
}

impl MarketDataLoader {
    pub fn new(source: Arc<dyn PriceSource>, config: &DataSourceConfig) -> Self {
        Self {
            source,
            permits: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            retries: config.fetch_retries,
            min_history: config.min_history,
        }
    }

    /// Builds the loader over the provider named in the configuration.
    pub fn from_config(config: &DataSourceConfig) -> Result<Self, DataError> {
        let source: Arc<dyn PriceSource> = match config.provider {
            DataProvider::Yahoo => Arc::new(YahooClient::new(config.base_url.clone())?),
            DataProvider::Synthetic => Arc::new(SyntheticSource::new()),
        };
        Ok(Self::new(source, config))
    }

    /// Fetches both tickers and inner-joins them on trading day.
    pub async fn load_pair(
        &self,
        ticker1: &str,
        ticker2: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AlignedPrices, DataError> {
        let (first, second) = futures::future::try_join(
            self.load_series(ticker1, start, end),
            self.load_series(ticker2, start, end),
        )
        .await?;

        let aligned = AlignedPrices::inner_join(&first, &second);
        tracing::debug!(
            ticker1,
            ticker2,
            rows1 = first.len(),
            rows2 = second.len(),
            aligned = aligned.len(),
            "Aligned price series."
        );

        if aligned.len() < self.min_history {
            return Err(DataError::InsufficientHistory {
                found: aligned.len(),
                required: self.min_history,
            });
        }

        Ok(aligned)
    }

    /// Fetches one ticker, repeating a failed fetch up to the configured number of retries.
    pub async fn load_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(ticker, start, end).await {
                Ok(series) => return Ok(series),
                Err(e @ DataError::ClientBuild(_)) => return Err(e),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(ticker, attempt, error = %e, "Price fetch failed, retrying.");
                }
                Err(e) => {
                    tracing::warn!(ticker, error = %e, "Price fetch failed, giving up.");
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let _permit = self.permits.acquire().await.map_err(|e| DataError::Transport {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })?;

        match tokio::time::timeout(self.fetch_timeout, self.source.fetch_daily(ticker, start, end))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(DataError::Timeout {
                ticker: ticker.to_string(),
                secs: self.fetch_timeout.as_secs(),
            }),
        }
    }
}
