//! Configuration management for the customer search engine.
//!
//! This module handles loading and validating configuration from environment variables,
//! reading a `.env` file first if one is present.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Smallest writer memory budget tantivy accepts for one indexing thread.
const MIN_WRITER_MEMORY_MB: usize = 15;

/// Configuration for the customer search engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the on-disk index
    pub index_path: PathBuf,

    /// Seconds between background rebuilds (default: 10)
    pub rebuild_interval_secs: u64,

    /// Result cap used when a caller does not supply one (default: 100)
    pub default_max_results: usize,

    /// Memory budget for the index writer in megabytes (default: 50)
    pub writer_memory_mb: usize,

    /// Number of generated customers seeded into the record source (default: 100000)
    pub dummy_customer_count: usize,

    /// Search term run once after the first rebuild (default: "wal")
    pub demo_search_term: String,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `CUSTOMER_INDEX_PATH`: Index directory (default: `search_index/customers`)
    /// - `REBUILD_INTERVAL_SECS`: Rebuild interval in seconds (default: 10)
    /// - `DEFAULT_MAX_RESULTS`: Default result cap (default: 100)
    /// - `INDEX_WRITER_MEMORY_MB`: Writer memory budget (default: 50, minimum 15)
    /// - `DUMMY_CUSTOMER_COUNT`: Generated customers (default: 100000)
    /// - `DEMO_SEARCH_TERM`: Startup search term (default: "wal")
    /// - `LOG_LEVEL`: Logging level (default: "info")
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let index_path = env::var("CUSTOMER_INDEX_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.index_path);

        let rebuild_interval_secs =
            Self::parse_env_u64("REBUILD_INTERVAL_SECS", defaults.rebuild_interval_secs)?;
        if rebuild_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "REBUILD_INTERVAL_SECS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let default_max_results =
            Self::parse_env_usize("DEFAULT_MAX_RESULTS", defaults.default_max_results)?;
        if default_max_results == 0 {
            return Err(ConfigError::InvalidValue {
                var: "DEFAULT_MAX_RESULTS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let writer_memory_mb =
            Self::parse_env_usize("INDEX_WRITER_MEMORY_MB", defaults.writer_memory_mb)?;
        if writer_memory_mb < MIN_WRITER_MEMORY_MB {
            return Err(ConfigError::InvalidValue {
                var: "INDEX_WRITER_MEMORY_MB".to_string(),
                reason: format!("Must be at least {}", MIN_WRITER_MEMORY_MB),
            });
        }

        let dummy_customer_count =
            Self::parse_env_usize("DUMMY_CUSTOMER_COUNT", defaults.dummy_customer_count)?;

        let demo_search_term =
            env::var("DEMO_SEARCH_TERM").unwrap_or(defaults.demo_search_term);

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            index_path,
            rebuild_interval_secs,
            default_max_results,
            writer_memory_mb,
            dummy_customer_count,
            demo_search_term,
            log_level,
        })
    }

    /// Interval between background rebuilds.
    pub fn rebuild_interval(&self) -> Duration {
        Duration::from_secs(self.rebuild_interval_secs)
    }

    /// Writer memory budget in bytes.
    pub fn writer_memory_bytes(&self) -> usize {
        self.writer_memory_mb * 1_000_000
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_path: PathBuf::from("search_index/customers"),
            rebuild_interval_secs: 10,
            default_max_results: 100,
            writer_memory_mb: 50,
            dummy_customer_count: 100_000,
            demo_search_term: "wal".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    // Helper to set and unset env vars for testing
    struct EnvGuard {
        vars: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.vars.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.index_path, PathBuf::from("search_index/customers"));
        assert_eq!(config.rebuild_interval_secs, 10);
        assert_eq!(config.default_max_results, 100);
        assert_eq!(config.writer_memory_mb, 50);
        assert_eq!(config.rebuild_interval(), Duration::from_secs(10));
        assert_eq!(config.writer_memory_bytes(), 50_000_000);
    }

    #[test]
    #[serial]
    fn test_config_from_env_valid() {
        let mut guard = EnvGuard::new();
        guard.set("CUSTOMER_INDEX_PATH", "/tmp/customer-index");
        guard.set("REBUILD_INTERVAL_SECS", "30");
        guard.set("DEFAULT_MAX_RESULTS", "25");
        guard.set("DEMO_SEARCH_TERM", "smith");

        let config = Config::from_env().unwrap();
        assert_eq!(config.index_path, PathBuf::from("/tmp/customer-index"));
        assert_eq!(config.rebuild_interval_secs, 30);
        assert_eq!(config.default_max_results, 25);
        assert_eq!(config.demo_search_term, "smith");
    }

    #[test]
    #[serial]
    fn test_config_zero_interval_rejected() {
        let mut guard = EnvGuard::new();
        guard.set("REBUILD_INTERVAL_SECS", "0");

        match Config::from_env() {
            Err(ConfigError::InvalidValue { var, .. }) => {
                assert_eq!(var, "REBUILD_INTERVAL_SECS");
            }
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_writer_memory_below_minimum() {
        let mut guard = EnvGuard::new();
        guard.set("INDEX_WRITER_MEMORY_MB", "4");

        match Config::from_env() {
            Err(ConfigError::InvalidValue { var, .. }) => {
                assert_eq!(var, "INDEX_WRITER_MEMORY_MB");
            }
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_parse_env_u64() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_U64", "42");

        let result = Config::parse_env_u64("TEST_U64", 10);
        assert_eq!(result.unwrap(), 42);

        let result = Config::parse_env_u64("NONEXISTENT", 10);
        assert_eq!(result.unwrap(), 10);
    }

    #[test]
    #[serial]
    fn test_parse_env_usize_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_USIZE_INVALID", "not-a-number");

        let result = Config::parse_env_usize("TEST_USIZE_INVALID", 10);
        assert!(result.is_err());
    }
}
