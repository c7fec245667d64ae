//! Keyed store connection settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Where and how to reach the cache store
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store hostname; required, there is no sensible default
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub password: Option<String>,

    /// Logical database index
    #[serde(default)]
    pub database: i64,

    /// Bound on establishing the connection, including the initial PING
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Bound on each symbol's write
    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            password: None,
            database: 0,
            connect_timeout_ms: default_timeout_ms(),
            write_timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_port() -> u16 {
    6379
}

fn default_timeout_ms() -> u64 {
    5000
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// `host:port/db`, safe to log.
    pub fn endpoint(&self) -> String {
        format!(
            "{}:{}/{}",
            self.host.as_deref().unwrap_or("<unset>"),
            self.port,
            self.database
        )
    }

    pub fn connection_info(&self) -> Result<redis::ConnectionInfo, PersistenceError> {
        let host = match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => {
                return Err(PersistenceError::InvalidConfig(
                    "store.host is not set".to_string(),
                ))
            }
        };

        Ok(redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(host, self.port),
            redis: redis::RedisConnectionInfo {
                db: self.database,
                password: self.password.clone(),
                ..Default::default()
            },
        })
    }
}

// Manual impl keeps the password out of logs
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .finish()
    }
}
