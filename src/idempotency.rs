//! In-memory idempotency cache for task creation.

use std::{collections::HashMap, sync::Arc, time::Duration};

use sha2::{Digest, Sha256};
use tokio::{sync::Mutex, time::Instant};

use crate::models::Record;

/// How long a stored response stays replayable.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache of create responses keyed by caller token and request fingerprint.
///
/// Expired entries are purged on every access. Cloning shares the map.
#[derive(Debug, Clone)]
pub struct IdempotencyStore {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, (Instant, Record)>>>,
}

impl Default for IdempotencyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdempotencyStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Record> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        entries.get(key).map(|(_, value)| value.clone())
    }

    pub async fn store(&self, key: impl Into<String>, value: Record) {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        entries.insert(key.into(), (Instant::now() + self.ttl, value));
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn purge_expired(entries: &mut HashMap<String, (Instant, Record)>) {
    let now = Instant::now();
    entries.retain(|_, (expires_at, _)| *expires_at > now);
}

/// Cache key for a task create: the caller's token plus the SHA-256 of
/// `"{user_story_id}:{subject}"`.
pub fn cache_key(raw_key: &str, user_story_id: Option<i64>, subject: &str) -> String {
    let story = user_story_id.map(|id| id.to_string()).unwrap_or_default();
    let digest = Sha256::digest(format!("{}:{}", story, subject).as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{:02x}", byte)).collect();
    format!("{}:{}", raw_key, hex)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn task(id: i64) -> Record {
        json!({ "id": id, "subject": "Write docs" })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn returns_stored_value_within_ttl() {
        let store = IdempotencyStore::new();
        store.store("k", task(1)).await;

        tokio::time::advance(Duration::from_secs(23 * 60 * 60)).await;

        assert_eq!(store.get("k").await, Some(task(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_evicted_on_access() {
        let store = IdempotencyStore::with_ttl(Duration::from_secs(60));
        store.store("k", task(1)).await;

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.get("k").await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn get_evicts_expired_entries_for_other_keys() {
        let store = IdempotencyStore::with_ttl(Duration::from_secs(60));
        store.store("k", task(1)).await;

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.get("other").await, None);
        assert_eq!(store.entries.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = IdempotencyStore::new();
        let other = store.clone();
        store.store("k", task(2)).await;
        assert_eq!(other.len().await, 1);
    }

    #[test]
    fn cache_key_is_token_plus_sha256() {
        let key = cache_key("retry-1", Some(42), "Write docs");
        let (raw, digest) = key.split_once(':').unwrap();
        assert_eq!(raw, "retry-1");
        assert_eq!(digest.len(), 64);
        assert_ne!(key, cache_key("retry-1", Some(43), "Write docs"));
        assert_eq!(key, cache_key("retry-1", Some(42), "Write docs"));
    }
}
