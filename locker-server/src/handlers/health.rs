use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::app_state::AppState;

/// Pings both backing stores and reports `200` only if each answered.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db = state.lockers.count_available().await;
    let redis = state.lock_store.exists("health:liveness").await;

    match (&db, &redis) {
        (Ok(_), Ok(_)) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "db": "reachable", "redis": "reachable" })),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "db": if db.is_ok() { "reachable" } else { "unreachable" },
                "redis": if redis.is_ok() { "reachable" } else { "unreachable" },
            })),
        ),
    }
}
