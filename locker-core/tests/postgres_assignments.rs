use chrono::{Duration, Utc};
use sqlx::PgPool;

use locker_core::domain::AssignmentState;
use locker_core::infra::postgres::{PostgresAssignmentsRepository, PostgresLockersRepository, PostgresUsersRepository};
use locker_core::ports::{AssignmentsRepository, LockersRepository, UsersRepository};

async fn seed_student(pool: &PgPool, student_id: &str, serial_id: i64) {
    let users = PostgresUsersRepository::new(pool.clone());
    users
        .upsert_user(student_id, "Test Student", "01012345678", serial_id)
        .await
        .expect("seed student");
}

async fn seed_locker(pool: &PgPool, locker_id: i32) {
    sqlx::query!(
        "INSERT INTO locker_locations (location_id, location_name) VALUES ('lib-main', 'Main Library') ON CONFLICT DO NOTHING"
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query!(
        "INSERT INTO locker_info (locker_id, location_id) VALUES ($1, 'lib-main')",
        locker_id,
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../migrations")]
async fn hold_then_confirm_sets_locker_owner(pool: PgPool) {
    seed_student(&pool, "2024320000", 123456789012).await;
    seed_locker(&pool, 1).await;

    let assignments = PostgresAssignmentsRepository::new(pool.clone());
    let lockers = PostgresLockersRepository::new(pool.clone());

    let hold = assignments
        .insert_hold(1, "2024320000", Utc::now() + Duration::minutes(5))
        .await
        .expect("insert hold");
    assert_eq!(hold.state, AssignmentState::Hold);

    assignments.confirm(1, "2024320000").await.expect("confirm");

    let locker = lockers.get_locker(1).await.unwrap().expect("locker exists");
    assert_eq!(locker.owner.as_deref(), Some("2024320000"));
    assert!(!locker.is_available());
}

#[sqlx::test(migrations = "../migrations")]
async fn second_hold_on_same_locker_is_rejected(pool: PgPool) {
    seed_student(&pool, "2024320000", 111111111111).await;
    seed_student(&pool, "2024320001", 222222222222).await;
    seed_locker(&pool, 2).await;

    let assignments = PostgresAssignmentsRepository::new(pool.clone());
    assignments
        .insert_hold(2, "2024320000", Utc::now() + Duration::minutes(5))
        .await
        .expect("first hold succeeds");

    let second = assignments
        .insert_hold(2, "2024320001", Utc::now() + Duration::minutes(5))
        .await;
    assert!(second.is_err());
}

#[sqlx::test(migrations = "../migrations")]
async fn release_clears_owner_and_allows_rehold(pool: PgPool) {
    seed_student(&pool, "2024320000", 333333333333).await;
    seed_locker(&pool, 3).await;

    let assignments = PostgresAssignmentsRepository::new(pool.clone());
    assignments
        .insert_hold(3, "2024320000", Utc::now() + Duration::minutes(5))
        .await
        .unwrap();
    assignments.confirm(3, "2024320000").await.unwrap();
    assignments.release(3, "2024320000").await.unwrap();

    let holds = assignments.list_active_holds().await.unwrap();
    assert!(holds.is_empty());

    assignments
        .insert_hold(3, "2024320000", Utc::now() + Duration::minutes(5))
        .await
        .expect("locker should be re-holdable after release");
}
