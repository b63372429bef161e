use config::{Config, ConfigError, Environment, File};
use mempool_fee_estimator::{EstimatorConfig, LedgerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub estimator: EstimatorConfig,
    pub ledger: LedgerSettings,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 8080)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Inclusion ledger configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LedgerSettings {
    /// Accept included items older than the newest one (default: false)
    pub allow_backfill: bool,
    /// Upper bound on records scanned per estimate (default: 10000)
    pub max_query_samples: usize,
    /// Blocks of history kept below the newest record (default: 2000)
    pub retention_blocks: u32,
    /// Seconds between pruning passes (default: 600)
    pub prune_interval_secs: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            allow_backfill: ledger.allow_backfill,
            max_query_samples: ledger.max_query_samples,
            retention_blocks: 2_000,
            prune_interval_secs: 600,
        }
    }
}

impl LedgerSettings {
    /// The subset of settings the ledger itself enforces
    pub fn to_ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            allow_backfill: self.allow_backfill,
            max_query_samples: self.max_query_samples,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from config file if specified via environment variable
        if let Ok(config_file) = std::env::var("FEE_ESTIMATOR_CONFIG_FILE") {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        } else {
            // Try to load default config files
            builder = builder
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config").required(false));
        }

        builder
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            // Still allow environment overrides
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Renders the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Environment overrides, e.g. `FEE_ESTIMATOR_SERVER__PORT=9090`
    fn environment() -> Environment {
        Environment::with_prefix("FEE_ESTIMATOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.estimator, EstimatorConfig::default());
        assert!(!config.ledger.allow_backfill);
        assert_eq!(config.ledger.max_query_samples, 10_000);
        assert_eq!(config.ledger.retention_blocks, 2_000);
    }

    #[test]
    #[serial]
    fn test_load_without_sources_uses_defaults() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("FEE_ESTIMATOR_SERVER__PORT", "9090");
        env::set_var("FEE_ESTIMATOR_ESTIMATOR__PERCENTILE", "0.9");
        env::set_var("FEE_ESTIMATOR_LEDGER__ALLOW_BACKFILL", "true");

        let config = AppConfig::load();

        // Clean up before asserting so a failure leaves no state behind
        env::remove_var("FEE_ESTIMATOR_SERVER__PORT");
        env::remove_var("FEE_ESTIMATOR_ESTIMATOR__PERCENTILE");
        env::remove_var("FEE_ESTIMATOR_LEDGER__ALLOW_BACKFILL");

        let config = config.unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.estimator.percentile, 0.9);
        assert!(config.ledger.allow_backfill);
    }

    #[test]
    #[serial]
    fn test_from_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "server:\n  port: 3000\nestimator:\n  seconds_per_block: 60\n  max_fee_rate:\n    mojos_per_clvm_cost: 500\nledger:\n  retention_blocks: 100\n"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.estimator.seconds_per_block, 60);
        assert_eq!(config.estimator.max_fee_rate.to_subunit_per_cost(), 500);
        assert_eq!(config.estimator.percentile, EstimatorConfig::DEFAULT_PERCENTILE);
        assert_eq!(config.ledger.retention_blocks, 100);
    }

    #[test]
    #[serial]
    fn test_yaml_round_trip_through_file() {
        let mut config = AppConfig::default();
        config.server.port = 4321;
        config.ledger.prune_interval_secs = 5;

        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();

        assert_eq!(AppConfig::from_file(file.path()).unwrap(), config);
    }
}
