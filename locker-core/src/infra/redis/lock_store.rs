use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::error::{ReservationError, Result};
use crate::ports::{ExpiredKeyEvent, ExpiredKeyStream, LockStore};

/// Redis-backed implementation of the `LockStore` port.
///
/// Uses a `ConnectionManager` for regular commands (auto-reconnecting,
/// cheap to clone) and opens a dedicated pub/sub connection per subscription,
/// since pub/sub occupies a connection for its lifetime.
#[derive(Clone)]
pub struct RedisLockStore {
    client: Client,
    conn: ConnectionManager,
}

impl RedisLockStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("connecting to redis lock store at {}", redis_url);

        let client = Client::open(redis_url)
            .map_err(|e| ReservationError::Internal(format!("failed to create redis client: {e}")))?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(|e| ReservationError::Internal(format!("failed to connect to redis: {e}")))?;

        Ok(Self { client, conn })
    }

    /// Enable keyspace notifications for expired-key events. Idempotent;
    /// safe to call on every startup.
    pub async fn enable_expiry_notifications(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("CONFIG")
            .arg("SET")
            .arg("notify-keyspace-events")
            .arg("Ex")
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn set_if_absent_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        let opts = redis::SetOptions::default()
            .conditional_set(redis::ExistenceCheck::NX)
            .with_expiration(redis::SetExpiry::EX(ttl.as_secs().max(1)));
        let result: Option<String> = conn.set_options(key, value, opts).await?;
        Ok(result.is_some())
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn subscribe_key_expirations(&self, pattern: &str) -> Result<ExpiredKeyStream> {
        self.enable_expiry_notifications().await?;

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(ReservationError::from)?;

        let expired_channel_pattern = "__keyevent@0__:expired";
        pubsub
            .psubscribe(expired_channel_pattern)
            .await
            .map_err(ReservationError::from)?;

        debug!(pattern, "subscribed to key expiration notifications");

        let prefix = pattern.trim_end_matches('*').to_string();
        let stream = pubsub.into_on_message().filter_map(move |msg| {
            let key: String = msg.get_payload().ok()?;
            if key.starts_with(&prefix) {
                Some(ExpiredKeyEvent { key })
            } else {
                None
            }
        });

        let stream: Pin<Box<dyn Stream<Item = ExpiredKeyEvent> + Send>> = Box::pin(stream);
        Ok(stream)
    }
}

impl std::fmt::Debug for RedisLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLockStore").finish_non_exhaustive()
    }
}
