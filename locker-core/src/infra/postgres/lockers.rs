use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::Locker;
use crate::error::Result;
use crate::ports::LockersRepository;

/// PostgreSQL-backed implementation of the `LockersRepository` port.
#[derive(Clone)]
pub struct PostgresLockersRepository {
    pool: PgPool,
}

impl PostgresLockersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockersRepository for PostgresLockersRepository {
    async fn list_lockers(&self) -> Result<Vec<Locker>> {
        let rows = sqlx::query!(
            r#"
            SELECT li.locker_id, li.location_id, ll.location_name, li.owner
            FROM locker_info li
            JOIN locker_locations ll ON ll.location_id = li.location_id
            ORDER BY li.locker_id
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Locker {
                locker_id: r.locker_id,
                location_id: r.location_id,
                location_name: r.location_name,
                owner: r.owner,
            })
            .collect())
    }

    async fn get_locker(&self, locker_id: i32) -> Result<Option<Locker>> {
        let row = sqlx::query!(
            r#"
            SELECT li.locker_id, li.location_id, ll.location_name, li.owner
            FROM locker_info li
            JOIN locker_locations ll ON ll.location_id = li.location_id
            WHERE li.locker_id = $1
            "#,
            locker_id,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Locker {
            locker_id: r.locker_id,
            location_id: r.location_id,
            location_name: r.location_name,
            owner: r.owner,
        }))
    }

    async fn get_locker_for_owner(&self, student_id: &str) -> Result<Option<Locker>> {
        let row = sqlx::query!(
            r#"
            SELECT li.locker_id, li.location_id, ll.location_name, li.owner
            FROM locker_info li
            JOIN locker_locations ll ON ll.location_id = li.location_id
            WHERE li.owner = $1
            "#,
            student_id,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Locker {
            locker_id: r.locker_id,
            location_id: r.location_id,
            location_name: r.location_name,
            owner: r.owner,
        }))
    }

    async fn count_available(&self) -> Result<i64> {
        let row = sqlx::query!("SELECT count(*) AS \"count!\" FROM locker_info WHERE owner IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.count)
    }
}
