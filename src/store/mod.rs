//! Short-lived key-value storage for OAuth state tokens and credentials.
//!
//! Two backends implement [`KeyValueStore`]:
//! - [`MemoryStore`] - single-process, `DashMap` with lazy expiry plus a sweep task
//! - [`RedisStore`] - shared across instances, native `EX` expiry
//!
//! Values are opaque strings (JSON produced by the OAuth module). Every entry
//! the connector writes carries a TTL, so nothing outlives a handshake for long.

mod memory;
mod redis;

pub use self::memory::{run_expiry_sweep, MemoryStore};
pub use self::redis::RedisStore;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value store with per-key expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// `None` means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Fetch the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically fetch and remove the value under `key`.
    ///
    /// At most one concurrent caller observes `Some` for a given write.
    async fn take(&self, key: &str) -> Result<Option<String>>;
}

/// Key holding the CSRF state blob for one (org, user) pair.
pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("state:{}:{}", org_id, user_id)
}

/// Key holding the one-time credential blob for one (org, user) pair.
pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("credentials:{}:{}", org_id, user_id)
}
