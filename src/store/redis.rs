//! Redis-backed store, shared by every connector instance.

use super::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::time::Duration;

/// Redis key-value store.
///
/// Holds one multiplexed connection; clones of it are cheap and share the
/// underlying socket.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    key_prefix: String,
}

impl RedisStore {
    /// Connect to redis and verify the server answers `PING`.
    pub async fn connect(redis_url: &str, key_prefix: String) -> Result<Self> {
        let client = Client::open(redis_url).context("Invalid redis URL")?;
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to redis")?;

        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .context("Redis ping failed")?;

        Ok(Self {
            connection,
            key_prefix,
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        prefixed(&self.key_prefix, key)
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection.clone();

        match ttl {
            // SET EX takes whole seconds and rejects 0
            Some(ttl) => {
                let _: () = conn
                    .set_ex(&key, value, ttl.as_secs().max(1))
                    .await
                    .context("Redis SET EX failed")?;
            }
            None => {
                let _: () = conn.set(&key, value).await.context("Redis SET failed")?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection.clone();

        let value: Option<String> = conn.get(&key).await.context("Redis GET failed")?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection.clone();

        let _: () = conn.del(&key).await.context("Redis DEL failed")?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let key = self.prefixed_key(key);
        let mut conn = self.connection.clone();

        // GETDEL (redis >= 6.2) makes the one-time read atomic
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .context("Redis GETDEL failed")?;
        Ok(value)
    }
}
