use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

use locker_core::domain::{AuthenticatedUser, Locker};
use locker_core::ReservationError;

use crate::app_state::AppState;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct LockerResponse {
    pub locker_id: i32,
    pub location_id: String,
    pub location_name: String,
    pub available: bool,
}

impl From<Locker> for LockerResponse {
    fn from(l: Locker) -> Self {
        Self {
            locker_id: l.locker_id,
            location_id: l.location_id,
            location_name: l.location_name,
            available: l.owner.is_none(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LockerListResponse {
    pub lockers: Vec<LockerResponse>,
    pub available_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MyLockerResponse {
    pub locker: Option<LockerResponse>,
}

pub async fn list_lockers(State(state): State<AppState>) -> AppResult<Json<LockerListResponse>> {
    let lockers = state.lockers.list_lockers().await.map_err(AppError::from)?;
    let available_count = state.lockers.count_available().await.map_err(AppError::from)?;
    Ok(Json(LockerListResponse {
        lockers: lockers.into_iter().map(LockerResponse::from).collect(),
        available_count,
    }))
}

pub async fn my_locker(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AppResult<Json<MyLockerResponse>> {
    let locker = state
        .lockers
        .get_locker_for_owner(&caller.student_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(MyLockerResponse {
        locker: locker.map(LockerResponse::from),
    }))
}

fn require_application_open(state: &AppState) -> AppResult<()> {
    if state.config.is_application_open(chrono::Utc::now()) {
        Ok(())
    } else {
        Err(AppError::from(ReservationError::WindowClosed(
            "locker reservations are not open right now".to_string(),
        )))
    }
}

pub async fn hold_locker(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(locker_id): Path<i32>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    require_application_open(&state)?;
    state
        .reservations
        .hold(locker_id, &caller.student_id)
        .await
        .map_err(AppError::from)?;

    let locker = state
        .lockers
        .get_locker(locker_id)
        .await
        .map_err(AppError::from)?;

    let minutes = state.config.hold_ttl.as_secs() / 60;
    let expires_in = format!("{minutes} minutes");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "locker held",
            "locker": locker.map(LockerResponse::from),
            "expires_in": expires_in,
        })),
    ))
}

pub async fn confirm_locker(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(locker_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .reservations
        .confirm(locker_id, &caller.student_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(serde_json::json!({ "message": "locker confirmed" })))
}

pub async fn release_locker(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(locker_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .reservations
        .release(locker_id, &caller.student_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(serde_json::json!({ "message": "locker released" })))
}

pub async fn release_hold(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(locker_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .reservations
        .release_hold(locker_id, &caller.student_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(serde_json::json!({ "message": "hold released" })))
}
