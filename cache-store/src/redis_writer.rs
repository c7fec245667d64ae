// Redis Cache Writer
// Applies cache records to Redis through a multiplexed connection manager

use redis::aio::ConnectionManager;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::PersistenceError;
use crate::projection::{CachePayload, CacheRecord};
use crate::writer::CacheWriter;

/// Value records become `SET key json EX ttl`; registry records become
/// `SADD` plus `EXPIRE`. One `apply` call is one `MULTI`/`EXEC` pipeline.
pub struct RedisCacheWriter {
    manager: ConnectionManager,
    endpoint: String,
}

impl RedisCacheWriter {
    /// Connect within the configured timeout and verify with `PING`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, PersistenceError> {
        let endpoint = config.endpoint();
        let client = redis::Client::open(config.connection_info()?)?;

        let timeout = config.connect_timeout();
        let manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| PersistenceError::Timeout {
                operation: "store connect",
                timeout_ms: config.connect_timeout_ms,
            })??;

        let writer = Self { manager, endpoint };
        tokio::time::timeout(timeout, writer.ping())
            .await
            .map_err(|_| PersistenceError::Timeout {
                operation: "store ping",
                timeout_ms: config.connect_timeout_ms,
            })??;

        info!("Connected to Redis at {}", writer.endpoint);
        Ok(writer)
    }
}

/// Build the transactional pipeline for a set of records.
fn pipeline_for(records: &[CacheRecord]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();

    for record in records {
        let seconds = record.ttl.as_secs();
        match &record.payload {
            CachePayload::Json(json) => {
                pipe.set_ex(&record.key, json, seconds).ignore();
            }
            CachePayload::SetMember(member) => {
                pipe.sadd(&record.key, member).ignore();
                pipe.expire(&record.key, seconds as i64).ignore();
            }
        }
    }

    pipe
}

#[async_trait::async_trait]
impl CacheWriter for RedisCacheWriter {
    async fn apply(&self, records: &[CacheRecord]) -> Result<(), PersistenceError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.manager.clone();
        pipeline_for(records)
            .query_async::<()>(&mut conn)
            .await?;

        debug!("Wrote {} records to {}", records.len(), self.endpoint);
        Ok(())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        let mut conn = self.manager.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(PersistenceError::Command(format!(
                "unexpected PING reply: {reply}"
            )));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis://{}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::CacheView;
    use std::time::Duration;

    #[test]
    fn pipeline_is_transactional_and_ordered() {
        let records = vec![
            CacheRecord {
                view: CacheView::Latest,
                key: "bavest:latest:AAPL".to_string(),
                ttl: Duration::from_secs(3600),
                payload: CachePayload::Json("{}".to_string()),
            },
            CacheRecord {
                view: CacheView::SymbolRegistry,
                key: "bavest:symbols".to_string(),
                ttl: Duration::from_secs(86_400),
                payload: CachePayload::SetMember("AAPL".to_string()),
            },
        ];

        let packed = String::from_utf8_lossy(&pipeline_for(&records).get_packed_pipeline())
            .into_owned();

        let order = ["MULTI", "SETEX", "SADD", "EXPIRE", "EXEC"];
        let mut cursor = 0;
        for command in order {
            let found = packed[cursor..]
                .find(command)
                .unwrap_or_else(|| panic!("{command} missing from {packed:?}"));
            cursor += found + command.len();
        }
        assert!(packed.contains("86400"));
        assert!(packed.contains("3600"));
    }

    #[tokio::test]
    async fn connect_without_host_is_a_config_error() {
        let err = RedisCacheWriter::connect(&StoreConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PersistenceError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails_within_timeout() {
        let config = StoreConfig {
            host: Some("127.0.0.1".to_string()),
            port: 1,
            connect_timeout_ms: 300,
            ..StoreConfig::default()
        };

        let started = std::time::Instant::now();
        let err = RedisCacheWriter::connect(&config).await.err().unwrap();

        assert!(
            matches!(
                err,
                PersistenceError::ConnectionRefused(_)
                    | PersistenceError::Timeout { .. }
                    | PersistenceError::Unavailable(_)
            ),
            "unexpected error: {err:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
