use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    BacktestParams, Config, DataProvider, DataSourceConfig, LoggingConfig, ServerConfig,
    StatisticsParams, ValidationRules,
};

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional. Environment variables prefixed with `PAIRSCOPE__`
/// override file values, using `__` between nesting levels
/// (e.g. `PAIRSCOPE__SERVER__PORT=9000`).
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`] with an explicit file path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("PAIRSCOPE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("statistics.rolling_windows"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Rejects parameter combinations the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        let stats = &self.statistics;
        if stats.zscore_lookback < 2 {
            return invalid("statistics.zscore_lookback must be at least 2");
        }
        if stats.rolling_windows.is_empty() || stats.rolling_windows.iter().any(|&w| w < 2) {
            return invalid("statistics.rolling_windows must be non-empty and every window at least 2");
        }
        if stats.grid_points < 2 {
            return invalid("statistics.grid_points must be at least 2");
        }
        if !stats.grid_std_padding.is_finite() || stats.grid_std_padding < 0.0 {
            return invalid("statistics.grid_std_padding must be a non-negative number");
        }
        if stats.min_joint_observations < 2 {
            return invalid("statistics.min_joint_observations must be at least 2");
        }

        let bt = &self.backtest;
        if !(bt.exit_z.is_finite() && bt.entry_z.is_finite()) || bt.exit_z < 0.0 {
            return invalid("backtest thresholds must be finite and exit_z non-negative");
        }
        if bt.exit_z >= bt.entry_z {
            return invalid("backtest.exit_z must be below backtest.entry_z");
        }
        if !(bt.leg_allocation > 0.0 && bt.leg_allocation <= 1.0) {
            return invalid("backtest.leg_allocation must be in (0, 1]");
        }
        if bt.periods_per_year == 0 {
            return invalid("backtest.periods_per_year must be positive");
        }

        let data = &self.data_source;
        if data.max_concurrent_fetches == 0 {
            return invalid("data_source.max_concurrent_fetches must be positive");
        }
        if data.fetch_timeout_secs == 0 {
            return invalid("data_source.fetch_timeout_secs must be positive");
        }
        if data.min_history < 2 {
            return invalid("data_source.min_history must be at least 2");
        }

        let rules = &self.validation;
        if !(rules.max_capital.is_finite() && rules.max_capital > 0.0) {
            return invalid("validation.max_capital must be a positive number");
        }
        if rules.max_ticker_len == 0 {
            return invalid("validation.max_ticker_len must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.statistics.rolling_windows, vec![30, 60, 90]);
        assert_eq!(config.statistics.zscore_lookback, 20);
        assert_eq!(config.backtest.entry_z, 2.0);
        assert_eq!(config.backtest.exit_z, 0.5);
        assert_eq!(config.data_source.fetch_retries, 1);
        assert_eq!(config.data_source.fetch_timeout_secs, 10);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.data_source.provider, DataProvider::Yahoo);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[data_source]\nprovider = \"synthetic\"\n\n[backtest]\nentry_z = 1.5\n\n[statistics]\nrolling_windows = [10, 20]"
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();

        assert_eq!(config.data_source.provider, DataProvider::Synthetic);
        assert_eq!(config.data_source.min_history, 5);
        assert_eq!(config.backtest.entry_z, 1.5);
        assert_eq!(config.backtest.exit_z, 0.5);
        assert_eq!(config.statistics.rolling_windows, vec![10, 20]);
    }

    #[test]
    fn rejects_exit_threshold_above_entry() {
        let mut config = Config::default();
        config.backtest.exit_z = 2.5;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_degenerate_lookback() {
        let mut config = Config::default();
        config.statistics.zscore_lookback = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.statistics.rolling_windows = vec![30, 0];
        assert!(config.validate().is_err());
    }
}
