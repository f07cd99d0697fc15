use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Assignment, Locker, UpsertOutcome, User};
use crate::error::Result;

/// Typed access to the `users` table. Login-or-register is a single
/// conditional-insert operation so the service layer never races itself.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn upsert_user(
        &self,
        student_id: &str,
        name: &str,
        phone_number: &str,
        serial_id: i64,
    ) -> Result<(User, UpsertOutcome)>;

    async fn get_user_by_serial(&self, serial_id: i64) -> Result<Option<User>>;
    async fn get_user_by_student_id(&self, student_id: &str) -> Result<Option<User>>;
}

/// Typed access to `locker_info` joined with `locker_locations`.
#[async_trait]
pub trait LockersRepository: Send + Sync {
    async fn list_lockers(&self) -> Result<Vec<Locker>>;
    async fn get_locker(&self, locker_id: i32) -> Result<Option<Locker>>;
    async fn get_locker_for_owner(&self, student_id: &str) -> Result<Option<Locker>>;
    async fn count_available(&self) -> Result<i64>;
}

/// Typed access to `locker_assignments`, including the transactional
/// hold/confirm/release/release-hold/reap operations.
///
/// Each mutating method is its own transaction boundary; the reservation
/// engine composes them without holding connections across `.await` points
/// that belong to a different store.
#[async_trait]
pub trait AssignmentsRepository: Send + Sync {
    /// Insert a fresh `hold` row. Fails (via the partial unique index) if an
    /// active assignment already exists for this locker or this user.
    async fn insert_hold(
        &self,
        locker_id: i32,
        student_id: &str,
        hold_expires_at: DateTime<Utc>,
    ) -> Result<Assignment>;

    /// Transition the caller's `hold` row to `confirmed` and set
    /// `locker_info.owner`, atomically. Returns `Conflict` if either update
    /// affects zero rows.
    async fn confirm(&self, locker_id: i32, student_id: &str) -> Result<()>;

    /// Transition the caller's `confirmed` row to `cancelled` and clear
    /// `locker_info.owner`, atomically.
    async fn release(&self, locker_id: i32, student_id: &str) -> Result<()>;

    /// Delete the caller's `hold` row for `locker_id`. Returns `NotFound` if
    /// no such hold exists.
    async fn release_hold(&self, locker_id: i32, student_id: &str) -> Result<()>;

    /// Mark any assignment still in `hold` for `locker_id` as `expired`.
    /// A missing row is not an error; returns whether a row was updated.
    async fn expire_hold(&self, locker_id: i32) -> Result<bool>;

    /// All assignments currently in the `hold` state, for the periodic sweep.
    async fn list_active_holds(&self) -> Result<Vec<Assignment>>;
}

/// A single renewal credential record as persisted in `auth_refresh_tokens`.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_serial: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Typed access to `auth_refresh_tokens`.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(
        &self,
        user_serial: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        user_agent: &str,
        ip: &str,
    ) -> Result<()>;

    async fn get_active(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>>;
    async fn revoke(&self, token_hash: &str) -> Result<()>;
    async fn revoke_all_for_user(&self, user_serial: i64) -> Result<()>;
}
