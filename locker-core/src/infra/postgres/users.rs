use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{UpsertOutcome, User};
use crate::error::{ReservationError, Result};
use crate::ports::UsersRepository;

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn upsert_user(
        &self,
        student_id: &str,
        name: &str,
        phone_number: &str,
        serial_id: i64,
    ) -> Result<(User, UpsertOutcome)> {
        let rec = sqlx::query!(
            r#"
            INSERT INTO users (serial_id, student_id, name, phone_number)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (serial_id) DO UPDATE
                SET name = EXCLUDED.name,
                    phone_number = EXCLUDED.phone_number,
                    updated_at = now()
            RETURNING serial_id, student_id, name, phone_number, created_at, updated_at,
                      (xmax = 0) AS "inserted!"
            "#,
            serial_id,
            student_id,
            name,
            phone_number,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("users_student_id_key") {
                    return ReservationError::Conflict(
                        "student_id already registered under a different identity".to_string(),
                    );
                }
            }
            ReservationError::from(e)
        })?;

        let user = User {
            serial_id: rec.serial_id,
            student_id: rec.student_id,
            name: rec.name,
            phone_number: rec.phone_number,
            created_at: rec.created_at,
            updated_at: rec.updated_at,
        };
        let outcome = if rec.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Existing
        };

        Ok((user, outcome))
    }

    async fn get_user_by_serial(&self, serial_id: i64) -> Result<Option<User>> {
        let row = sqlx::query!(
            "SELECT serial_id, student_id, name, phone_number, created_at, updated_at
             FROM users WHERE serial_id = $1",
            serial_id,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            serial_id: r.serial_id,
            student_id: r.student_id,
            name: r.name,
            phone_number: r.phone_number,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }

    async fn get_user_by_student_id(&self, student_id: &str) -> Result<Option<User>> {
        let row = sqlx::query!(
            "SELECT serial_id, student_id, name, phone_number, created_at, updated_at
             FROM users WHERE student_id = $1",
            student_id,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            serial_id: r.serial_id,
            student_id: r.student_id,
            name: r.name,
            phone_number: r.phone_number,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }
}
