use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use locker_config::Config;
use locker_core::auth::{RefreshService, TokenService};
use locker_core::domain::{Assignment, AssignmentState, Locker, UpsertOutcome, User};
use locker_core::error::{ReservationError, Result};
use locker_core::ports::{
    AssignmentsRepository, ExpiredKeyEvent, LockStore, LockersRepository, RefreshTokenRecord,
    RefreshTokenRepository, UsersRepository,
};

use crate::app_state::AppState;

#[derive(Default)]
pub struct InMemoryLockStore {
    data: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn set_if_absent_with_ttl(&self, key: &str, value: &str, _ttl: Duration) -> Result<bool> {
        let mut data = self.data.lock().unwrap();
        if data.contains_key(key) {
            Ok(false)
        } else {
            data.insert(key.to_string(), value.to_string());
            Ok(true)
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, _ttl: Duration) -> Result<()> {
        self.data.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn subscribe_key_expirations(
        &self,
        _pattern: &str,
    ) -> Result<std::pin::Pin<Box<dyn tokio_stream::Stream<Item = ExpiredKeyEvent> + Send>>> {
        Ok(Box::pin(tokio_stream::empty()))
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UsersRepository for InMemoryUsers {
    async fn upsert_user(
        &self,
        student_id: &str,
        name: &str,
        phone_number: &str,
        serial_id: i64,
    ) -> Result<(User, UpsertOutcome)> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|u| u.student_id == student_id) {
            existing.name = name.to_string();
            existing.phone_number = phone_number.to_string();
            existing.updated_at = Utc::now();
            return Ok((existing.clone(), UpsertOutcome::Existing));
        }
        let user = User {
            serial_id,
            student_id: student_id.to_string(),
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(user.clone());
        Ok((user, UpsertOutcome::Created))
    }

    async fn get_user_by_serial(&self, serial_id: i64) -> Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.serial_id == serial_id).cloned())
    }

    async fn get_user_by_student_id(&self, student_id: &str) -> Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.student_id == student_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryLockers {
    rows: Mutex<HashMap<i32, Locker>>,
}

impl InMemoryLockers {
    pub fn seed(&self, locker_id: i32) {
        self.rows.lock().unwrap().insert(
            locker_id,
            Locker {
                locker_id,
                location_id: "lib-main".to_string(),
                location_name: "Main Library".to_string(),
                owner: None,
            },
        );
    }
}

#[async_trait]
impl LockersRepository for InMemoryLockers {
    async fn list_lockers(&self) -> Result<Vec<Locker>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn get_locker(&self, locker_id: i32) -> Result<Option<Locker>> {
        Ok(self.rows.lock().unwrap().get(&locker_id).cloned())
    }

    async fn get_locker_for_owner(&self, student_id: &str) -> Result<Option<Locker>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|l| l.owner.as_deref() == Some(student_id))
            .cloned())
    }

    async fn count_available(&self) -> Result<i64> {
        Ok(self.rows.lock().unwrap().values().filter(|l| l.is_available()).count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryAssignments {
    rows: Mutex<HashMap<i32, Assignment>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl AssignmentsRepository for InMemoryAssignments {
    async fn insert_hold(&self, locker_id: i32, student_id: &str, hold_expires_at: DateTime<Utc>) -> Result<Assignment> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.get(&locker_id) {
            if matches!(existing.state, AssignmentState::Hold | AssignmentState::Confirmed) {
                return Err(ReservationError::Conflict("active assignment exists".to_string()));
            }
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let assignment = Assignment {
            id: *next_id,
            locker_id,
            student_id: student_id.to_string(),
            state: AssignmentState::Hold,
            hold_expires_at: Some(hold_expires_at),
            confirmed_at: None,
            released_at: None,
            created_at: Utc::now(),
        };
        rows.insert(locker_id, assignment.clone());
        Ok(assignment)
    }

    async fn confirm(&self, locker_id: i32, student_id: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&locker_id) {
            Some(a) if a.student_id == student_id && a.state == AssignmentState::Hold => {
                a.state = AssignmentState::Confirmed;
                a.confirmed_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(ReservationError::Conflict("no matching hold".to_string())),
        }
    }

    async fn release(&self, locker_id: i32, student_id: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&locker_id) {
            Some(a) if a.student_id == student_id && a.state == AssignmentState::Confirmed => {
                a.state = AssignmentState::Cancelled;
                a.released_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(ReservationError::Conflict("no matching confirmed assignment".to_string())),
        }
    }

    async fn release_hold(&self, locker_id: i32, student_id: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get(&locker_id) {
            Some(a) if a.student_id == student_id && a.state == AssignmentState::Hold => {
                rows.remove(&locker_id);
                Ok(())
            }
            _ => Err(ReservationError::NotFound("no matching hold".to_string())),
        }
    }

    async fn expire_hold(&self, locker_id: i32) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&locker_id) {
            Some(a) if a.state == AssignmentState::Hold => {
                a.state = AssignmentState::Expired;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_active_holds(&self) -> Result<Vec<Assignment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.state == AssignmentState::Hold)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokens {
    rows: Mutex<Vec<RefreshTokenRecord>>,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn insert(
        &self,
        user_serial: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        _user_agent: &str,
        _ip: &str,
    ) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64;
        rows.push(RefreshTokenRecord {
            id,
            user_serial,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked_at: None,
        });
        Ok(())
    }

    async fn get_active(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.token_hash == token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> Result<()> {
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.token_hash == token_hash {
                row.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_serial: i64) -> Result<()> {
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.user_serial == user_serial {
                row.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

fn test_config() -> Config {
    for (key, value) in [
        ("APP_ADDR", "127.0.0.1:0"),
        ("DATABASE_URL", "postgres://unused/unused"),
        ("REDIS_URL", "redis://unused"),
        ("JWT_ACCESS_SECRET", "unit-test-secret-unit-test-secret"),
        ("JWT_ISS", "locker-service"),
        ("JWT_AUD", "locker-clients"),
        ("JWT_ACCESS_TTL_MIN", "10"),
        ("JWT_REFRESH_TTL_H", "336"),
        ("HOLD_TTL_SECONDS", "300"),
        ("REAPER_SWEEP_INTERVAL_SECONDS", "10"),
        ("LOCKER_APPLICATION_START", "2000-01-01T00:00:00Z"),
        ("LOCKER_APPLICATION_END", "2999-01-01T00:00:00Z"),
    ] {
        std::env::set_var(key, value);
    }
    Config::from_env().expect("test config loads from the fixed env above")
}

/// Build an `AppState` wired entirely to in-memory fakes, with the
/// application window open from year 2000 to year 2999 so tests don't race
/// a real clock.
pub fn test_state() -> (AppState, Arc<InMemoryLockers>) {
    let config = Arc::new(test_config());
    let users: Arc<dyn UsersRepository> = Arc::new(InMemoryUsers::default());
    let lockers = Arc::new(InMemoryLockers::default());
    let lockers_port: Arc<dyn LockersRepository> = lockers.clone();
    let assignments: Arc<dyn AssignmentsRepository> = Arc::new(InMemoryAssignments::default());
    let lock_store: Arc<dyn LockStore> = Arc::new(InMemoryLockStore::default());
    let refresh_tokens: Arc<dyn RefreshTokenRepository> = Arc::new(InMemoryRefreshTokens::default());

    let tokens = TokenService::new(
        config.jwt_access_secret.clone().into_bytes(),
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
        config.jwt_access_ttl,
    );
    let refresh = RefreshService::new(refresh_tokens, config.jwt_refresh_ttl);

    let state = AppState::new(config, users, lockers_port, assignments, lock_store, tokens, refresh);
    (state, lockers)
}
