// ============================
// petmarket-backend-lib/src/router.rs
// ============================
//! HTTP router assembly.
use crate::handlers::account;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the account API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/accounts/register", post(account::register))
        .route("/api/accounts/login", post(account::login))
        .route("/api/accounts/refresh", post(account::refresh))
        .route("/api/accounts/logout", post(account::logout))
        .route("/api/accounts/me", get(account::me))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
