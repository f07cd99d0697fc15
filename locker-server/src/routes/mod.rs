pub mod v1;

use crate::app_state::AppState;
use crate::handlers::health;
use axum::routing::get;
use axum::Router;

pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", v1::create_v1_router(state))
}
