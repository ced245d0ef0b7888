// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Email already registered")]
    DuplicateEmail,

    /// Covers both unknown email and wrong password; callers must not be
    /// able to tell the two apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Malformed token")]
    TokenMalformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unexpected token kind")]
    WrongTokenKind,

    #[error("No active session for this account")]
    SessionRevoked,

    #[error("Presented refresh token has been superseded")]
    SessionMismatch,

    #[error("Backing store unavailable")]
    Unavailable,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::TokenMalformed
            | AppError::InvalidSignature
            | AppError::TokenExpired
            | AppError::WrongTokenKind
            | AppError::SessionRevoked
            | AppError::SessionMismatch => StatusCode::UNAUTHORIZED,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail => "ACCT_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::TokenMalformed => "TOKEN_001",
            AppError::InvalidSignature => "TOKEN_002",
            AppError::TokenExpired => "TOKEN_003",
            AppError::WrongTokenKind => "TOKEN_004",
            AppError::SessionRevoked => "SESSION_001",
            AppError::SessionMismatch => "SESSION_002",
            AppError::Unavailable => "STORE_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use.
    ///
    /// Credential and session failures must not reveal whether an email is
    /// registered.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::DuplicateEmail => "Email is already in use".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::TokenMalformed => "Malformed token".to_string(),
            AppError::InvalidSignature => "Invalid token signature".to_string(),
            AppError::TokenExpired => "Token expired".to_string(),
            AppError::WrongTokenKind => "Unexpected token kind".to_string(),
            AppError::SessionRevoked | AppError::SessionMismatch => {
                "Session is no longer active".to_string()
            },
            AppError::Unavailable => "Service temporarily unavailable".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        // Create a JSON response with error details
        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
