// In-memory cache store, for tests and dry runs

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::PersistenceError;
use crate::projection::{CachePayload, CacheRecord};
use crate::writer::CacheWriter;

#[derive(Debug, Clone)]
enum StoredValue {
    Text(String),
    Set(BTreeSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: StoredValue,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Same semantics as the Redis writer: JSON payloads replace the key, set
/// members accumulate, and every write resets the key's expiry.
pub struct InMemoryCacheWriter {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheWriter {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// String value at `key`, if present and not expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => match &entry.value {
                StoredValue::Text(text) => Some(text.clone()),
                StoredValue::Set(_) => None,
            },
            _ => None,
        }
    }

    /// Members of the set at `key`, sorted.
    pub async fn members(&self, key: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => match &entry.value {
                StoredValue::Set(members) => members.iter().cloned().collect(),
                StoredValue::Text(_) => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Remaining time to live for `key`.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at.saturating_duration_since(now))
    }

    /// Live keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.keys().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired entries, returning how many went.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}

impl Default for InMemoryCacheWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheWriter for InMemoryCacheWriter {
    async fn apply(&self, records: &[CacheRecord]) -> Result<(), PersistenceError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        // Reject the whole batch before touching anything
        for record in records {
            if let CachePayload::SetMember(_) = record.payload {
                if let Some(entry) = entries.get(&record.key) {
                    if entry.is_live(now) && matches!(entry.value, StoredValue::Text(_)) {
                        return Err(PersistenceError::Command(format!(
                            "WRONGTYPE key {} holds a string value",
                            record.key
                        )));
                    }
                }
            }
        }

        for record in records {
            let expires_at = now + record.ttl;
            match &record.payload {
                CachePayload::Json(json) => {
                    entries.insert(
                        record.key.clone(),
                        Entry {
                            value: StoredValue::Text(json.clone()),
                            expires_at,
                        },
                    );
                }
                CachePayload::SetMember(member) => {
                    let mut members = match entries.remove(&record.key) {
                        Some(Entry {
                            value: StoredValue::Set(members),
                            expires_at: previous,
                        }) if previous > now => members,
                        _ => BTreeSet::new(),
                    };
                    members.insert(member.clone());
                    entries.insert(
                        record.key.clone(),
                        Entry {
                            value: StoredValue::Set(members),
                            expires_at,
                        },
                    );
                }
            }
        }

        debug!("Applied {} records in memory", records.len());
        Ok(())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
