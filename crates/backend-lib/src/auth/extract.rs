// ============================
// petmarket-backend-lib/src/auth/extract.rs
// ============================
//! Per-request authentication gate.
//!
//! Extracting an [`IdentityContext`] verifies the bearer token as an
//! access token and nothing more: access tokens are stateless, so this
//! path performs no storage I/O and an access token cannot be revoked
//! before its expiry. Only refresh is checked against storage.
use crate::auth::token::TokenKind;
use crate::error::AppError;
use crate::AppState;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use petmarket_common::Role;
use std::sync::Arc;

/// Verified caller identity, valid for the lifetime of one request
#[derive(Debug, Clone)]
pub struct IdentityContext {
    pub account_id: i64,
    pub email: String,
    pub role: Role,
    /// Expiry of the presenting access token, seconds since the epoch
    pub expires_at: i64,
}

impl FromRequestParts<Arc<AppState>> for IdentityContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::TokenMalformed)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenMalformed)?;

        // Rejections carry the taxonomy code; a bad token never downgrades
        // the request to anonymous.
        let claims = state.codec.verify(token, TokenKind::Access)?;

        Ok(IdentityContext {
            account_id: claims.uid,
            email: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        })
    }
}
