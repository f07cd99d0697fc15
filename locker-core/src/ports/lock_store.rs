use async_trait::async_trait;
use std::time::Duration;
use tokio_stream::Stream;
use std::pin::Pin;

use crate::error::Result;

/// A key-expiration event from the lock store's pub/sub keyspace notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredKeyEvent {
    pub key: String,
}

pub type ExpiredKeyStream = Pin<Box<dyn Stream<Item = ExpiredKeyEvent> + Send>>;

/// The cache-side coordination layer. Backed by Redis in production;
/// mocked in reservation engine unit tests.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// `SET key value NX EX ttl`. Returns `true` only if this call created the key.
    async fn set_if_absent_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Unconditional `SET key value EX ttl`, used for blacklist tombstones.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Subscribe to key-expiration notifications matching `pattern`
    /// (e.g. `locker:hold:*`). The adapter is responsible for ensuring the
    /// underlying store has `notify-keyspace-events` enabled.
    async fn subscribe_key_expirations(&self, pattern: &str) -> Result<ExpiredKeyStream>;
}
