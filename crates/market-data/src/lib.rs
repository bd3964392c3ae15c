//! # Pairscope Market Data
//!
//! Fetches daily price history for a pair of tickers and aligns both series on
//! trading day. The `PriceSource` trait is the seam between the loader and the
//! outside world, so the live HTTP client and the offline generator are
//! interchangeable.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;

pub mod error;
pub mod loader;
pub mod responses;
pub mod synthetic;
pub mod yahoo;

// --- Public API ---
pub use error::DataError;
pub use loader::MarketDataLoader;
pub use synthetic::SyntheticSource;
pub use yahoo::YahooClient;

/// The generic, abstract interface for a daily price provider.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches the daily closes of `ticker` for trading days in `[start, end)`.
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;
}
