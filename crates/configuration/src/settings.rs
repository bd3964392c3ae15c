use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; a missing section falls back
/// to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data_source: DataSourceConfig,
    pub statistics: StatisticsParams,
    pub backtest: BacktestParams,
    pub validation: ValidationRules,
    pub logging: LoggingConfig,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Which price source backs the market data loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DataProvider {
    /// Daily history from the Yahoo Finance chart API.
    #[default]
    Yahoo,
    /// Deterministic generated prices. No network access.
    Synthetic,
}

/// Parameters for fetching and aligning price history.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub provider: DataProvider,
    /// Base URL of the chart endpoint; the ticker is appended as a path segment.
    pub base_url: String,
    /// Upper bound on a single fetch, retries included separately.
    pub fetch_timeout_secs: u64,
    /// How many times a failed fetch is repeated before giving up.
    pub fetch_retries: u32,
    /// Fetches allowed in flight at once, across all requests.
    pub max_concurrent_fetches: usize,
    /// Smallest number of aligned trading days an analysis accepts.
    pub min_history: usize,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            fetch_timeout_secs: 10,
            fetch_retries: 1,
            max_concurrent_fetches: 4,
            min_history: 5,
        }
    }
}

/// Parameters for the statistics engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatisticsParams {
    /// Lookback of the rolling spread z-score.
    pub zscore_lookback: usize,
    /// Trailing windows of the rolling correlation surface.
    pub rolling_windows: Vec<usize>,
    /// Number of grid points per axis of the joint density surface.
    pub grid_points: usize,
    /// The density grid spans `[min - k*std, max + k*std]` on each axis.
    pub grid_std_padding: f64,
    /// Below this many returns the joint density surface is omitted.
    pub min_joint_observations: usize,
}

impl Default for StatisticsParams {
    fn default() -> Self {
        Self {
            zscore_lookback: 20,
            rolling_windows: vec![30, 60, 90],
            grid_points: 50,
            grid_std_padding: 3.0,
            min_joint_observations: 30,
        }
    }
}

/// Parameters for the z-score pairs strategy and its simulation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// A position opens when `|z|` rises above this.
    pub entry_z: f64,
    /// An open position closes when `|z|` falls to or below this.
    pub exit_z: f64,
    /// Fraction of the initial capital given to each leg (0.5 = equal dollar legs).
    pub leg_allocation: f64,
    /// Used to annualize the per-period return volatility.
    pub periods_per_year: u32,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            entry_z: 2.0,
            exit_z: 0.5,
            leg_allocation: 0.5,
            periods_per_year: 252,
        }
    }
}

/// Limits applied to incoming analysis requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub max_capital: f64,
    pub max_ticker_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_capital: 1e12,
            max_ticker_len: 10,
        }
    }
}

/// Log output settings. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
