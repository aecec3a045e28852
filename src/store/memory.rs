//! In-process store backed by `DashMap`.

use super::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory key-value store with per-entry expiry.
///
/// Expired entries are invisible to readers immediately and are physically
/// removed either on the next read of that key or by [`run_expiry_sweep`].
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = match ttl {
            Some(ttl) => Some(
                Utc::now()
                    + chrono::Duration::from_std(ttl).context("TTL out of range")?,
            ),
            None => None,
        };

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        // Removal happens outside the read guard; remove_if re-checks expiry so a
        // fresh value written in between is left alone.
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(_, entry)| entry.value))
    }
}

/// Background task to periodically drop expired entries
pub async fn run_expiry_sweep(store: MemoryStore, interval_seconds: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));

    loop {
        interval.tick().await;
        let removed = store.sweep_expired();
        tracing::debug!(
            removed,
            remaining = store.len(),
            "Store expiry sweep complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set("state:o:u", "{\"state\":\"abc\"}", Some(Duration::from_secs(600)))
            .await
            .unwrap();

        let value = store.get("state:o:u").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"state\":\"abc\"}"));

        // get does not consume
        assert!(store.get("state:o:u").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "first", None).await.unwrap();
        store.set("k", "second", None).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.set("k", "v", None).await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());

        // Deleting again is fine
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = MemoryStore::new();
        store.set("credentials:o:u", "{}", None).await.unwrap();

        assert_eq!(store.take("credentials:o:u").await.unwrap().as_deref(), Some("{}"));
        assert!(store.take("credentials:o:u").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_invisible() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(Duration::from_millis(20))).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.get("k").await.unwrap().is_none());
        // Lazy removal on read
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_take_ignores_expired_entry() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(Duration::from_millis(20))).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.take("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = MemoryStore::new();
        store.set("short1", "v", Some(Duration::from_millis(20))).await.unwrap();
        store.set("short2", "v", Some(Duration::from_millis(20))).await.unwrap();
        store.set("long", "v", Some(Duration::from_secs(600))).await.unwrap();
        store.set("forever", "v", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.sweep_expired(), 2);
        assert_eq!(store.len(), 2);
        assert!(store.get("long").await.unwrap().is_some());
        assert!(store.get("forever").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v", None).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
