use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::app_state::AppState;
use crate::handlers::{auth, lockers};
use crate::middleware::require_auth;

pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/login-or-register", post(auth::login_or_register))
        .route("/auth/refresh", post(auth::refresh))
        .merge(create_protected_routes(state))
}

fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
        .route("/lockers", get(lockers::list_lockers))
        .route("/lockers/me", get(lockers::my_locker))
        .route("/lockers/:locker_id/hold", post(lockers::hold_locker))
        .route("/lockers/:locker_id/confirm", post(lockers::confirm_locker))
        .route("/lockers/:locker_id/release", post(lockers::release_locker))
        .route("/lockers/:locker_id/release-hold", post(lockers::release_hold))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
