// ============================
// petmarket-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `PetMarket` account service:
//! credential verification, signed-token issuance and refresh-token
//! rotation with at-most-one-active-session-per-account semantics.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod storage;

use crate::auth::{SessionService, TokenCodec};
use crate::config::Settings;
use crate::storage::{CredentialStore, RefreshSessionStore};
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Session lifecycle service
    pub auth: SessionService,
    /// Token codec, also used directly by request authentication
    pub codec: Arc<TokenCodec>,
    /// Settings manager
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over one backing store
    pub fn new<S>(store: Arc<S>, settings: Settings) -> anyhow::Result<Self>
    where
        S: CredentialStore + RefreshSessionStore + 'static,
    {
        let codec = Arc::new(TokenCodec::from_base64_secret(&settings.auth.secret)?);
        let auth = SessionService::new(
            store.clone() as Arc<dyn CredentialStore>,
            store as Arc<dyn RefreshSessionStore>,
            codec.clone(),
            &settings,
        );

        Ok(Self {
            auth,
            codec,
            settings: Arc::new(settings),
        })
    }
}
