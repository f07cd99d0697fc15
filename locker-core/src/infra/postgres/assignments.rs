use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Assignment, AssignmentState};
use crate::error::{ReservationError, Result};
use crate::ports::AssignmentsRepository;

/// PostgreSQL-backed implementation of the `AssignmentsRepository` port.
#[derive(Clone)]
pub struct PostgresAssignmentsRepository {
    pool: PgPool,
}

impl PostgresAssignmentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_active_index_conflict(e: sqlx::Error) -> ReservationError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.constraint() == Some("locker_assignments_active_locker_idx")
            || db_err.constraint() == Some("locker_assignments_active_student_idx")
        {
            return ReservationError::Conflict("an active assignment already exists".to_string());
        }
    }
    ReservationError::from(e)
}

#[async_trait]
impl AssignmentsRepository for PostgresAssignmentsRepository {
    async fn insert_hold(
        &self,
        locker_id: i32,
        student_id: &str,
        hold_expires_at: DateTime<Utc>,
    ) -> Result<Assignment> {
        let row = sqlx::query!(
            r#"
            INSERT INTO locker_assignments (locker_id, student_id, state, hold_expires_at)
            VALUES ($1, $2, 'hold', $3)
            RETURNING id, locker_id, student_id, state, hold_expires_at, confirmed_at, released_at, created_at
            "#,
            locker_id,
            student_id,
            hold_expires_at,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_active_index_conflict)?;

        Ok(Assignment {
            id: row.id,
            locker_id: row.locker_id,
            student_id: row.student_id,
            state: row.state.parse().map_err(ReservationError::Internal)?,
            hold_expires_at: row.hold_expires_at,
            confirmed_at: row.confirmed_at,
            released_at: row.released_at,
            created_at: row.created_at,
        })
    }

    async fn confirm(&self, locker_id: i32, student_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let assignment_rows = sqlx::query!(
            r#"
            UPDATE locker_assignments
            SET state = 'confirmed', confirmed_at = now()
            WHERE locker_id = $1 AND student_id = $2 AND state = 'hold'
            "#,
            locker_id,
            student_id,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if assignment_rows != 1 {
            return Err(ReservationError::Conflict(
                "no active hold for this locker and student".to_string(),
            ));
        }

        let locker_rows = sqlx::query!(
            "UPDATE locker_info SET owner = $2 WHERE locker_id = $1 AND owner IS NULL",
            locker_id,
            student_id,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if locker_rows != 1 {
            return Err(ReservationError::Conflict("locker already has an owner".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn release(&self, locker_id: i32, student_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let assignment_rows = sqlx::query!(
            r#"
            UPDATE locker_assignments
            SET state = 'cancelled', released_at = now()
            WHERE locker_id = $1 AND student_id = $2 AND state = 'confirmed'
            "#,
            locker_id,
            student_id,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if assignment_rows != 1 {
            return Err(ReservationError::Conflict(
                "no confirmed assignment for this locker and student".to_string(),
            ));
        }

        let locker_rows = sqlx::query!(
            "UPDATE locker_info SET owner = NULL WHERE locker_id = $1 AND owner = $2",
            locker_id,
            student_id,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if locker_rows != 1 {
            return Err(ReservationError::Conflict("locker owner mismatch".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn release_hold(&self, locker_id: i32, student_id: &str) -> Result<()> {
        let rows = sqlx::query!(
            "DELETE FROM locker_assignments WHERE locker_id = $1 AND student_id = $2 AND state = 'hold'",
            locker_id,
            student_id,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(ReservationError::NotFound(
                "no active hold for this locker and student".to_string(),
            ));
        }

        Ok(())
    }

    async fn expire_hold(&self, locker_id: i32) -> Result<bool> {
        let rows = sqlx::query!(
            "UPDATE locker_assignments SET state = 'expired' WHERE locker_id = $1 AND state = 'hold'",
            locker_id,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    async fn list_active_holds(&self) -> Result<Vec<Assignment>> {
        let rows = sqlx::query!(
            r#"
            SELECT id, locker_id, student_id, state, hold_expires_at, confirmed_at, released_at, created_at
            FROM locker_assignments WHERE state = 'hold'
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Assignment {
                    id: row.id,
                    locker_id: row.locker_id,
                    student_id: row.student_id,
                    state: row.state.parse().map_err(ReservationError::Internal)?,
                    hold_expires_at: row.hold_expires_at,
                    confirmed_at: row.confirmed_at,
                    released_at: row.released_at,
                    created_at: row.created_at,
                })
            })
            .collect()
    }
}
