//! Renewal credential issuance, verification, and mandatory rotation
//!
//! The plaintext renewal credential is a 32-byte CSPRNG value, url-safe
//! base64 encoded; only its SHA-256 digest is ever persisted. Verification
//! never distinguishes "not found" from "expired" from "revoked" — all three
//! surface as [`ReservationError::CredentialInvalid`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::error::{ReservationError, Result};
use crate::ports::RefreshTokenRepository;

const PLAINTEXT_LEN: usize = 32;

fn digest(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[derive(Clone)]
pub struct RefreshService {
    repo: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
    rng: Arc<SystemRandom>,
}

impl RefreshService {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self {
            repo,
            ttl,
            rng: Arc::new(SystemRandom::new()),
        }
    }

    fn random_plaintext(&self) -> Result<String> {
        let mut bytes = [0u8; PLAINTEXT_LEN];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| ReservationError::Internal("failed to generate renewal credential".to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Issue a fresh renewal credential for `user_serial`, returning the
    /// plaintext exactly once.
    pub async fn issue(&self, user_serial: i64, user_agent: &str, ip: &str) -> Result<String> {
        let plaintext = self.random_plaintext()?;
        let expires_at = Utc::now() + self.ttl;
        self.repo
            .insert(user_serial, &digest(&plaintext), expires_at, user_agent, ip)
            .await?;
        Ok(plaintext)
    }

    /// Look up the user serial bound to a presented plaintext credential,
    /// rejecting anything missing, expired, or revoked.
    pub async fn verify(&self, plaintext: &str) -> Result<i64> {
        let record = self
            .repo
            .get_active(&digest(plaintext))
            .await?
            .ok_or(ReservationError::CredentialInvalid)?;

        if record.revoked_at.is_some() || record.expires_at <= Utc::now() {
            return Err(ReservationError::CredentialInvalid);
        }

        Ok(record.user_serial)
    }

    pub async fn revoke(&self, plaintext: &str) -> Result<()> {
        self.repo.revoke(&digest(plaintext)).await
    }

    pub async fn revoke_all_for_user(&self, user_serial: i64) -> Result<()> {
        self.repo.revoke_all_for_user(user_serial).await
    }

    /// Verify `presented`, revoke it, and issue a fresh credential for the
    /// same user in one logical unit — single-use rotation.
    pub async fn rotate(&self, presented: &str, user_agent: &str, ip: &str) -> Result<(i64, String)> {
        let user_serial = self.verify(presented).await?;
        self.repo.revoke(&digest(presented)).await?;
        let fresh = self.issue(user_serial, user_agent, ip).await?;
        Ok((user_serial, fresh))
    }
}
