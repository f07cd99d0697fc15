use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::ports::{RefreshTokenRecord, RefreshTokenRepository};

/// PostgreSQL-backed implementation of the `RefreshTokenRepository` port.
#[derive(Clone)]
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn insert(
        &self,
        user_serial: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        user_agent: &str,
        ip: &str,
    ) -> Result<()> {
        sqlx::query!(
            r#"
            INSERT INTO auth_refresh_tokens (user_serial, token_hash, expires_at, user_agent, ip)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            user_serial,
            token_hash,
            expires_at,
            user_agent,
            ip,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_active(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        let row = sqlx::query!(
            r#"
            SELECT id, user_serial, token_hash, expires_at, revoked_at
            FROM auth_refresh_tokens WHERE token_hash = $1
            "#,
            token_hash,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| RefreshTokenRecord {
            id: r.id,
            user_serial: r.user_serial,
            token_hash: r.token_hash,
            expires_at: r.expires_at,
            revoked_at: r.revoked_at,
        }))
    }

    async fn revoke(&self, token_hash: &str) -> Result<()> {
        sqlx::query!(
            "UPDATE auth_refresh_tokens SET revoked_at = now() WHERE token_hash = $1 AND revoked_at IS NULL",
            token_hash,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_all_for_user(&self, user_serial: i64) -> Result<()> {
        sqlx::query!(
            "UPDATE auth_refresh_tokens SET revoked_at = now() WHERE user_serial = $1 AND revoked_at IS NULL",
            user_serial,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
