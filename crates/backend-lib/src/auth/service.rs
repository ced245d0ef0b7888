// ============================
// petmarket-backend-lib/src/auth/service.rs
// ============================
//! Session lifecycle orchestration: register, login, refresh, logout.
//!
//! Cross-request coordination happens entirely through the stores' atomic
//! primitives; the service itself keeps no mutable state, so it is correct
//! across horizontally scaled instances.
use crate::auth::password::{
    hash_password_secure, validate_password_strength, verify_password, PasswordRequirements,
};
use crate::auth::token::{TokenCodec, TokenKind};
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics::{
    ACCOUNT_REGISTERED, LOGIN_FAILURE, LOGIN_SUCCESS, LOGOUT, REFRESH_REJECTED, REFRESH_ROTATED,
};
use crate::storage::{CredentialStore, NewAccount, RefreshSessionStore, StoreError};
use metrics::counter;
use petmarket_common::{AccountInfo, Role, TokenPair};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Bounded retry budget for transient store failures. Credential and token
/// failures are never retried.
const STORE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Orchestrates credential verification, token issuance and refresh-token
/// rotation, enforcing at most one active session per account.
pub struct SessionService {
    accounts: Arc<dyn CredentialStore>,
    sessions: Arc<dyn RefreshSessionStore>,
    codec: Arc<TokenCodec>,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    password_requirements: PasswordRequirements,
}

impl SessionService {
    pub fn new(
        accounts: Arc<dyn CredentialStore>,
        sessions: Arc<dyn RefreshSessionStore>,
        codec: Arc<TokenCodec>,
        settings: &Settings,
    ) -> Self {
        Self {
            accounts,
            sessions,
            codec,
            access_ttl_secs: settings.auth.access_ttl_secs,
            refresh_ttl_secs: settings.auth.refresh_ttl_secs,
            password_requirements: settings.password_requirements.clone(),
        }
    }

    /// Create an account. Registration does not imply login; no tokens are
    /// issued.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        mut password: String,
        role: Option<Role>,
    ) -> Result<AccountInfo, AppError> {
        let email = normalize_email(email);
        if !validate_password_strength(&password, &self.password_requirements) {
            return Err(AppError::InvalidInput(
                self.password_requirements.describe(),
            ));
        }

        let password_hash = hash_password_secure(&mut password)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

        let new = NewAccount {
            name: name.to_string(),
            email: email.clone(),
            password_hash,
            role: role.unwrap_or(Role::User),
        };
        let account = retrying(|| self.accounts.create_account(new.clone())).await?;

        counter!(ACCOUNT_REGISTERED).increment(1);
        tracing::info!(email = %account.email, id = account.id, "account registered");
        Ok(info(&account))
    }

    /// Verify credentials and start a session.
    ///
    /// Unknown email and wrong password produce the same error so callers
    /// cannot enumerate accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let email = normalize_email(email);
        let account = retrying(|| self.accounts.account_by_email(&email)).await?;

        let Some(account) = account else {
            counter!(LOGIN_FAILURE).increment(1);
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(&account.password_hash, password) {
            counter!(LOGIN_FAILURE).increment(1);
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.codec.issue_pair(
            &account.email,
            account.id,
            account.role,
            self.access_ttl_secs,
            self.refresh_ttl_secs,
        )?;
        retrying(|| self.sessions.upsert(&account.email, &pair.refresh_token)).await?;

        counter!(LOGIN_SUCCESS).increment(1);
        tracing::info!(email = %account.email, "login succeeded");
        Ok(pair)
    }

    /// Exchange a live refresh token for a new access/refresh pair.
    ///
    /// The stored row is replaced wholesale, so the presented token is
    /// single-use: replaying it after a successful rotation fails with
    /// `SessionMismatch` even while its own expiry is still in the future.
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AppError> {
        let claims = self
            .codec
            .verify(presented, TokenKind::Refresh)
            .inspect_err(|_| counter!(REFRESH_REJECTED).increment(1))?;

        let stored = retrying(|| self.sessions.find_by_email(&claims.sub)).await?;
        let Some(stored) = stored else {
            counter!(REFRESH_REJECTED).increment(1);
            tracing::debug!(email = %claims.sub, "refresh for revoked session");
            return Err(AppError::SessionRevoked);
        };
        if stored != presented {
            counter!(REFRESH_REJECTED).increment(1);
            tracing::debug!(email = %claims.sub, "refresh with superseded token");
            return Err(AppError::SessionMismatch);
        }

        let pair = self.codec.issue_pair(
            &claims.sub,
            claims.uid,
            claims.role,
            self.access_ttl_secs,
            self.refresh_ttl_secs,
        )?;
        retrying(|| self.sessions.upsert(&claims.sub, &pair.refresh_token)).await?;

        counter!(REFRESH_ROTATED).increment(1);
        tracing::debug!(email = %claims.sub, "refresh token rotated");
        Ok(pair)
    }

    /// End the account's session. Idempotent; succeeds whether or not a
    /// session existed.
    pub async fn logout(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        retrying(|| self.sessions.delete_by_email(&email)).await?;
        counter!(LOGOUT).increment(1);
        tracing::info!(%email, "logged out");
        Ok(())
    }

    /// Public profile for an existing account
    pub async fn user_info(&self, email: &str) -> Result<AccountInfo, AppError> {
        let email = normalize_email(email);
        let account = retrying(|| self.accounts.account_by_email(&email)).await?;
        account
            .map(|a| info(&a))
            .ok_or_else(|| AppError::NotFound(format!("account {email}")))
    }
}

/// Emails function as the natural session key, so they are compared in one
/// canonical form everywhere.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn info(account: &crate::storage::Account) -> AccountInfo {
    AccountInfo {
        id: account.id,
        name: account.name.clone(),
        email: account.email.clone(),
        role: account.role,
    }
}

/// Run a store operation, retrying only the transient-failure class.
async fn retrying<T, Fut, F>(mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err @ StoreError::Duplicate(_)) => return Err(err.into()),
            Err(StoreError::Unavailable(reason)) => {
                attempt += 1;
                if attempt >= STORE_ATTEMPTS {
                    tracing::warn!(%reason, attempts = attempt, "store unavailable, giving up");
                    return Err(AppError::Unavailable);
                }
                tokio::time::sleep(RETRY_BACKOFF).await;
            },
        }
    }
}
