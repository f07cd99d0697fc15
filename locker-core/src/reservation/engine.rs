use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::Assignment;
use crate::error::{ReservationError, Result};
use crate::ports::{AssignmentsRepository, LockStore};

pub fn hold_key(locker_id: i32) -> String {
    format!("locker:hold:{locker_id}")
}

#[derive(Debug, Clone, Copy)]
pub struct ReservationConfig {
    pub hold_ttl: Duration,
}

/// Coordinates the hold/confirm/release state machine across the lock store
/// and the record store. The lock store is always touched first: a `hold` is
/// only ever durable in Postgres after the corresponding Redis key exists, so
/// a crash between the two leaves at worst an orphaned Redis key (harmless,
/// self-expiring) rather than a durable row with no caller-visible lock.
#[derive(Clone)]
pub struct ReservationEngine {
    assignments: Arc<dyn AssignmentsRepository>,
    lock_store: Arc<dyn LockStore>,
    config: ReservationConfig,
}

impl ReservationEngine {
    pub fn new(
        assignments: Arc<dyn AssignmentsRepository>,
        lock_store: Arc<dyn LockStore>,
        config: ReservationConfig,
    ) -> Self {
        Self {
            assignments,
            lock_store,
            config,
        }
    }

    /// If the Redis hold key has already expired but the reaper hasn't caught
    /// up yet, flip the stale `hold` row to `expired` so it stops blocking the
    /// partial unique index. Called before every fresh hold attempt.
    async fn reconcile_stale_hold(&self, locker_id: i32) -> Result<()> {
        if !self.lock_store.exists(&hold_key(locker_id)).await? {
            self.assignments.expire_hold(locker_id).await?;
        }
        Ok(())
    }

    pub async fn hold(&self, locker_id: i32, student_id: &str) -> Result<Assignment> {
        self.reconcile_stale_hold(locker_id).await?;

        let key = hold_key(locker_id);
        let acquired = self
            .lock_store
            .set_if_absent_with_ttl(&key, student_id, self.config.hold_ttl)
            .await?;
        if !acquired {
            return Err(ReservationError::Conflict(format!(
                "locker {locker_id} is already held or reserved"
            )));
        }

        let ttl = chrono::Duration::from_std(self.config.hold_ttl)
            .map_err(|_| ReservationError::Internal("hold ttl out of range".to_string()))?;
        let hold_expires_at = Utc::now() + ttl;

        match self.assignments.insert_hold(locker_id, student_id, hold_expires_at).await {
            Ok(assignment) => Ok(assignment),
            Err(err) => {
                // The record store rejected the insert (partial unique index hit or
                // transient failure); give up the lock we just took so the locker
                // isn't stuck behind a write that never happened.
                let _ = self.lock_store.delete(&key).await;
                Err(err)
            }
        }
    }

    pub async fn confirm(&self, locker_id: i32, student_id: &str) -> Result<()> {
        self.assignments.confirm(locker_id, student_id).await?;
        let _ = self.lock_store.delete(&hold_key(locker_id)).await;
        Ok(())
    }

    pub async fn release(&self, locker_id: i32, student_id: &str) -> Result<()> {
        self.assignments.release(locker_id, student_id).await?;
        let _ = self.lock_store.delete(&hold_key(locker_id)).await;
        Ok(())
    }

    pub async fn release_hold(&self, locker_id: i32, student_id: &str) -> Result<()> {
        self.assignments.release_hold(locker_id, student_id).await?;
        let _ = self.lock_store.delete(&hold_key(locker_id)).await;
        Ok(())
    }
}
