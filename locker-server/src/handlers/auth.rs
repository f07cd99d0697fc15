use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use locker_core::domain::{AuthenticatedUser, UpsertOutcome};
use locker_core::identity::IdentityInput;

use crate::app_state::AppState;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub serial_id: i64,
    pub student_id: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub student_id: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn client_context(headers: &HeaderMap, addr: Option<SocketAddr>) -> (String, String) {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let ip = addr.map(|a| a.ip().to_string()).unwrap_or_else(|| "unknown".to_string());
    (user_agent, ip)
}

/// Idempotent login-or-register: the same `(student_id, name, phone_number)`
/// triple always resolves to the same user and issues a fresh token pair.
/// 201 on first contact, 200 on every subsequent call.
pub async fn login_or_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<(StatusCode, Json<TokenPairResponse>)> {
    let identity = IdentityInput::validate(&request.student_id, &request.name, &request.phone_number)
        .map_err(AppError::from)?;
    let serial_id = identity.derive_serial();

    let (user, outcome) = state
        .users
        .upsert_user(&identity.student_id, &identity.name, &identity.phone_number, serial_id)
        .await
        .map_err(AppError::from)?;

    let access_token = state.tokens.issue(user.serial_id, &user.student_id).map_err(AppError::from)?;

    let (user_agent, ip) = client_context(&headers, connect_info.map(|c| c.0));
    let refresh_token = state
        .refresh
        .issue(user.serial_id, &user_agent, &ip)
        .await
        .map_err(AppError::from)?;

    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Existing => StatusCode::OK,
    };

    Ok((
        status,
        Json(TokenPairResponse {
            access_token,
            refresh_token,
            serial_id: user.serial_id,
            student_id: user.student_id,
        }),
    ))
}

/// Return the caller's own identity triple.
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AppResult<Json<MeResponse>> {
    let user = state
        .users
        .get_user_by_student_id(&caller.student_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    Ok(Json(MeResponse {
        student_id: user.student_id,
        name: user.name,
        phone_number: user.phone_number,
    }))
}

/// Verify and rotate a renewal credential, issuing a fresh access/refresh pair.
/// If the caller also presented their (soon-to-expire) access credential, it
/// is blacklisted immediately rather than left to expire naturally.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let (user_agent, ip) = client_context(&headers, connect_info.map(|c| c.0));

    let (serial_id, refresh_token) = state
        .refresh
        .rotate(&request.refresh_token, &user_agent, &ip)
        .await
        .map_err(AppError::from)?;

    let user = state
        .users
        .get_user_by_serial(serial_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::unauthorized("unknown user"))?;

    if let Some(old_access_token) = request.access_token.as_deref() {
        if let Some(claims) = locker_core::auth::TokenService::extract_unverified_claims(old_access_token) {
            let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
            state
                .blacklist
                .revoke_by_jti(&claims.jti, expires_at)
                .await
                .map_err(AppError::from)?;
        }
    }

    let access_token = state.tokens.issue(user.serial_id, &user.student_id).map_err(AppError::from)?;

    Ok(Json(TokenPairResponse {
        access_token,
        refresh_token,
        serial_id: user.serial_id,
        student_id: user.student_id,
    }))
}

/// Revoke the caller's current access credential and either the presented
/// renewal credential or, if none was presented, every renewal credential
/// belonging to the caller.
pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<LogoutRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let expires_at = chrono::DateTime::from_timestamp(caller.exp, 0).unwrap_or_else(Utc::now);
    state
        .blacklist
        .revoke_by_jti(&caller.jti, expires_at)
        .await
        .map_err(AppError::from)?;

    match request.refresh_token {
        Some(refresh_token) => state.refresh.revoke(&refresh_token).await.map_err(AppError::from)?,
        None => state
            .refresh
            .revoke_all_for_user(caller.serial_id)
            .await
            .map_err(AppError::from)?,
    }

    Ok(Json(serde_json::json!({ "status": "revoked" })))
}

/// Revoke every renewal credential for the caller, across all devices.
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AppResult<Json<serde_json::Value>> {
    let expires_at = chrono::DateTime::from_timestamp(caller.exp, 0).unwrap_or_else(Utc::now);
    state
        .blacklist
        .revoke_by_jti(&caller.jti, expires_at)
        .await
        .map_err(AppError::from)?;

    state
        .refresh
        .revoke_all_for_user(caller.serial_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(serde_json::json!({ "status": "revoked" })))
}
