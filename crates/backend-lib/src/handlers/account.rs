// ============================
// petmarket-backend-lib/src/handlers/account.rs
// ============================
//! Account endpoints: register, login, refresh, logout, me.
use crate::auth::IdentityContext;
use crate::error::AppError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use petmarket_common::{AccountInfo, LoginRequest, RefreshRequest, RegisterRequest, TokenPair};
use std::sync::Arc;

/// `POST /api/accounts/register`
///
/// Creates the account and returns its public profile. No tokens are
/// issued; the client logs in separately.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state
        .auth
        .register(&req.name, &req.email, req.password, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /api/accounts/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(pair))
}

/// `POST /api/accounts/refresh`
///
/// Exchanges a live refresh token for a new pair; the presented token is
/// dead afterwards.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

/// `POST /api/accounts/logout`
///
/// Requires an authenticated caller; the session to end is the caller's
/// own.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    identity: IdentityContext,
) -> Result<Json<serde_json::Value>, AppError> {
    state.auth.logout(&identity.email).await?;
    Ok(Json(serde_json::json!({ "message": "logged out" })))
}

/// `GET /api/accounts/me`
pub async fn me(
    State(state): State<Arc<AppState>>,
    identity: IdentityContext,
) -> Result<Json<AccountInfo>, AppError> {
    let profile = state.auth.user_info(&identity.email).await?;
    Ok(Json(profile))
}
