//! Access credential revocation

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::ports::LockStore;

const TOMBSTONE: &str = "revoked";

#[derive(Clone)]
pub struct Blacklist {
    lock_store: Arc<dyn LockStore>,
}

impl Blacklist {
    pub fn new(lock_store: Arc<dyn LockStore>) -> Self {
        Self { lock_store }
    }

    fn key_for_jti(jti: &str) -> String {
        format!("blacklist:{jti}")
    }

    fn key_for_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("blacklist:token:{:x}", hasher.finalize())
    }

    /// Tombstone a credential identified by `jti` until `expires_at`.
    pub async fn revoke_by_jti(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let ttl = remaining_ttl(expires_at);
        self.lock_store
            .set_with_ttl(&Self::key_for_jti(jti), TOMBSTONE, ttl)
            .await
    }

    /// Tombstone a credential that lacks a `jti` claim, keyed by a digest of
    /// its raw bytes instead.
    pub async fn revoke_by_token_digest(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let ttl = remaining_ttl(expires_at);
        self.lock_store
            .set_with_ttl(&Self::key_for_token(token), TOMBSTONE, ttl)
            .await
    }

    pub async fn contains_jti(&self, jti: &str) -> Result<bool> {
        self.lock_store.exists(&Self::key_for_jti(jti)).await
    }
}

fn remaining_ttl(expires_at: DateTime<Utc>) -> Duration {
    let secs = (expires_at - Utc::now()).num_seconds();
    Duration::from_secs(secs.max(1) as u64)
}
