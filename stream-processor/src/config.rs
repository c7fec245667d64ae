//! Processor configuration
//!
//! Sources, later wins: built-in defaults, an optional TOML file,
//! `PROCESSOR__*` environment variables (`__` separates nesting, so
//! `PROCESSOR__STORE__HOST` sets `store.host`), then the legacy
//! `REDIS_HOST` / `REDIS_PORT` variables.

use std::collections::HashMap;
use std::path::Path;

use cache_store::{StoreConfig, DEFAULT_KEY_PREFIX};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

const ENV_PREFIX: &str = "PROCESSOR";
const LEGACY_HOST_VAR: &str = "REDIS_HOST";
const LEGACY_PORT_VAR: &str = "REDIS_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required configuration: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Namespace for every cache key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            key_prefix: default_key_prefix(),
            store: StoreConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl ProcessorConfig {
    /// Load from the process environment and an optional file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(path, env)
    }

    /// Load against an explicit set of environment variables.
    pub fn load_with_env(
        path: Option<&Path>,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let legacy_host = env.get(LEGACY_HOST_VAR).cloned();
        let legacy_port = match env.get(LEGACY_PORT_VAR) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                field: LEGACY_PORT_VAR,
                reason: format!("'{raw}': {e}"),
            })?),
            None => None,
        };

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.into_iter().collect())),
            )
            .set_override_option("store.host", legacy_host)?
            .set_override_option("store.port", legacy_port.map(i64::from))?;

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Check every required field at once. Without a store (dry runs) the
    /// store endpoint is not required.
    pub fn validate(&self, require_store: bool) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        if require_store && self.store.host.as_deref().map_or(true, |h| h.trim().is_empty()) {
            missing.push("store.host");
        }
        if self.key_prefix.trim().is_empty() {
            missing.push("key_prefix");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields(missing));
        }

        self.level()?;
        if self.store.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "store.write_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|e| ConfigError::Invalid {
                field: "log_level",
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_any_source() {
        let config = ProcessorConfig::load_with_env(None, HashMap::new()).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.key_prefix, "bavest");
        assert_eq!(config.store.port, 6379);
        assert_eq!(config.store.connect_timeout_ms, 5000);
        assert_eq!(config.store.host, None);
    }

    #[test]
    fn missing_host_is_reported() {
        let config = ProcessorConfig::load_with_env(None, HashMap::new()).unwrap();
        match config.validate(true) {
            Err(ConfigError::MissingFields(fields)) => assert_eq!(fields, vec!["store.host"]),
            other => panic!("expected missing fields, got {other:?}"),
        }
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn every_missing_field_is_enumerated() {
        let config = ProcessorConfig {
            key_prefix: " ".to_string(),
            ..ProcessorConfig::default()
        };
        let err = config.validate(true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required configuration: store.host, key_prefix"
        );
    }

    #[test]
    fn legacy_variables_apply() {
        let config = ProcessorConfig::load_with_env(
            None,
            env(&[("REDIS_HOST", "cache.internal"), ("REDIS_PORT", "6380")]),
        )
        .unwrap();
        assert_eq!(config.store.host.as_deref(), Some("cache.internal"));
        assert_eq!(config.store.port, 6380);
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn bad_legacy_port_is_rejected() {
        let err = ProcessorConfig::load_with_env(None, env(&[("REDIS_PORT", "sixty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "REDIS_PORT", .. }));
    }

    #[test]
    fn prefixed_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\nkey_prefix = \"staging\"\n\n[store]\nhost = \"from-file\"\nwrite_timeout_ms = 250"
        )
        .unwrap();

        let config = ProcessorConfig::load_with_env(
            Some(file.path()),
            env(&[("PROCESSOR__STORE__HOST", "from-env")]),
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.key_prefix, "staging");
        assert_eq!(config.store.host.as_deref(), Some("from-env"));
        assert_eq!(config.store.write_timeout_ms, 250);
        assert_eq!(config.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn unknown_log_level_is_invalid() {
        let config = ProcessorConfig {
            log_level: "loud".to_string(),
            ..ProcessorConfig::default()
        };
        assert!(matches!(
            config.validate(false),
            Err(ConfigError::Invalid { field: "log_level", .. })
        ));
    }
}
