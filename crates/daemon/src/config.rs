//! Daemon configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `WAITROOM__SECTION__KEY` environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use waitroom_api_rpc::RpcServerConfig;
use waitroom_core::application::constants::{
    DEFAULT_ADMIT_BATCH_SIZE, DEFAULT_SCHEDULER_INITIAL_DELAY, DEFAULT_SCHEDULER_INTERVAL,
};
use waitroom_core::application::SchedulerConfig;

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "WAITROOM_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "waitroom.toml";
const ENV_PREFIX: &str = "WAITROOM";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_DATABASE_URL: &str = "~/.waitroom/queue.db";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub store: StoreSection,
    pub rpc: RpcSection,
    pub scheduler: SchedulerSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// SQLite URL or file path; `~` is expanded
    pub database_url: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl StoreSection {
    pub fn expanded_url(&self) -> String {
        shellexpand::tilde(&self.database_url).into_owned()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSection {
    pub host: String,
    pub port: u16,
}

impl Default for RpcSection {
    fn default() -> Self {
        let defaults = RpcServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
        }
    }
}

impl From<&RpcSection> for RpcServerConfig {
    fn from(section: &RpcSection) -> Self {
        RpcServerConfig {
            host: section.host.clone(),
            port: section.port,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub enabled: bool,
    pub batch_size: u64,
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            enabled: false,
            batch_size: DEFAULT_ADMIT_BATCH_SIZE,
            initial_delay_ms: DEFAULT_SCHEDULER_INITIAL_DELAY.as_millis() as u64,
            interval_ms: DEFAULT_SCHEDULER_INTERVAL.as_millis() as u64,
        }
    }
}

impl From<&SchedulerSection> for SchedulerConfig {
    fn from(section: &SchedulerSection) -> Self {
        SchedulerConfig {
            enabled: section.enabled,
            batch_size: section.batch_size,
            initial_delay: Duration::from_millis(section.initial_delay_ms),
            interval: Duration::from_millis(section.interval_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Directory for the daily-rolling log file; stdout only when unset
    pub directory: Option<String>,
}

impl DaemonConfig {
    /// Load from `$WAITROOM_CONFIG` (or `waitroom.toml`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(env_source());

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.batch_size == 0 {
            return Err(ConfigError::Message(
                "scheduler.batch_size must be at least 1".to_string(),
            ));
        }
        if self.scheduler.interval_ms == 0 {
            return Err(ConfigError::Message(
                "scheduler.interval_ms must be at least 1".to_string(),
            ));
        }
        if self.store.database_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "store.database_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::from_builder(Config::builder()).unwrap();

        assert_eq!(config.store.database_url, "~/.waitroom/queue.db");
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert_eq!(config.rpc.port, 9010);
        assert!(!config.scheduler.enabled);
        assert_eq!(config.scheduler.batch_size, 100);
        assert_eq!(config.scheduler.initial_delay_ms, 5000);
        assert_eq!(config.scheduler.interval_ms, 10000);
        assert!(config.log.directory.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [rpc]
            port = 9100

            [scheduler]
            enabled = true
            batch_size = 25
        "#;
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));

        let config = DaemonConfig::from_builder(builder).unwrap();

        assert_eq!(config.rpc.port, 9100);
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert!(config.scheduler.enabled);
        assert_eq!(config.scheduler.batch_size, 25);
        assert_eq!(config.scheduler.interval_ms, 10000);
    }

    #[test]
    fn test_env_overrides_file() {
        let toml = "[scheduler]\nbatch_size = 25\n";
        let env = HashMap::from([
            ("WAITROOM__SCHEDULER__BATCH_SIZE".to_string(), "7".to_string()),
            ("WAITROOM__LOG__DIRECTORY".to_string(), "/var/log/waitroom".to_string()),
        ]);
        let builder = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(env_source().source(Some(env)));

        let config = DaemonConfig::from_builder(builder).unwrap();

        assert_eq!(config.scheduler.batch_size, 7);
        assert_eq!(config.log.directory.as_deref(), Some("/var/log/waitroom"));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let builder = Config::builder()
            .add_source(File::from_str("[scheduler]\nbatch_size = 0\n", FileFormat::Toml));

        assert!(DaemonConfig::from_builder(builder).is_err());
    }

    #[test]
    fn test_section_conversions() {
        let section = SchedulerSection {
            enabled: true,
            batch_size: 3,
            initial_delay_ms: 1500,
            interval_ms: 250,
        };
        let scheduler = SchedulerConfig::from(&section);
        assert!(scheduler.enabled);
        assert_eq!(scheduler.initial_delay, Duration::from_millis(1500));
        assert_eq!(scheduler.interval, Duration::from_millis(250));

        let rpc = RpcServerConfig::from(&RpcSection {
            host: "0.0.0.0".to_string(),
            port: 1,
        });
        assert_eq!(rpc.host, "0.0.0.0");
        assert_eq!(rpc.port, 1);
    }

    #[test]
    fn test_tilde_expansion() {
        let section = StoreSection {
            database_url: "sqlite::memory:".to_string(),
        };
        assert_eq!(section.expanded_url(), "sqlite::memory:");

        let home = StoreSection::default().expanded_url();
        assert!(home.ends_with(".waitroom/queue.db"));
    }
}
