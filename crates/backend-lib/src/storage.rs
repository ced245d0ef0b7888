// ============================
// petmarket-backend-lib/src/storage.rs
// ============================
//! Storage abstraction with in-memory and flat-file implementations.
//!
//! The refresh-session store enforces the one-row-per-email invariant
//! structurally: both implementations key rows by email, and `upsert` is a
//! single atomic replace rather than a read-then-write sequence.
use crate::error::AppError;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use petmarket_common::Role;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Account record as persisted. The password hash never leaves the store
/// layer except for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Fields required to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Errors surfaced by storage backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AppError::DuplicateEmail,
            StoreError::Unavailable(_) => AppError::Unavailable,
        }
    }
}

/// Trait for account credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create an account, assigning its id; fails `Duplicate` when the
    /// email is already registered.
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;

    /// Look up an account by its (normalized) email
    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
}

/// Trait for refresh-session storage, keyed by account email
#[async_trait]
pub trait RefreshSessionStore: Send + Sync {
    /// Atomically replace any existing row for `email` with `token_value`
    async fn upsert(&self, email: &str, token_value: &str) -> Result<(), StoreError>;

    /// Current refresh token for `email`, if a session is live
    async fn find_by_email(&self, email: &str) -> Result<Option<String>, StoreError>;

    /// Delete the row for `email`; no-op when absent
    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory store backed by `DashMap`.
///
/// Per-key map operations supply the atomic insert-or-replace primitive;
/// no caller ever reads-modifies-writes a row.
#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<String, Account>,
    sessions: DashMap<String, String>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live refresh sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        use dashmap::mapref::entry::Entry;
        match self.accounts.entry(new.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(new.email)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let account = Account {
                    id,
                    name: new.name,
                    email: new.email,
                    password_hash: new.password_hash,
                    role: new.role,
                };
                slot.insert(account.clone());
                Ok(account)
            },
        }
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(email).map(|a| a.clone()))
    }
}

#[async_trait]
impl RefreshSessionStore for MemoryStore {
    async fn upsert(&self, email: &str, token_value: &str) -> Result<(), StoreError> {
        self.sessions
            .insert(email.to_string(), token_value.to_string());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        Ok(self.sessions.get(email).map(|t| t.clone()))
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        self.sessions.remove(email);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Flat-file implementation
// ---------------------------------------------------------------------------

/// Flat-file store.
///
/// Layout under the root directory:
///   accounts/<key>.json   one account record per email
///   sessions/<key>.token  current refresh token per email
///
/// `<key>` is the url-safe base64 form of the email, so arbitrary email
/// bytes cannot influence the path. One file per email makes the
/// single-session invariant structural; `create_new` gives atomic
/// duplicate detection and write-temp-then-rename gives atomic upsert.
#[derive(Clone)]
pub struct FlatFileStore {
    root: PathBuf,
    next_id: std::sync::Arc<AtomicI64>,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("accounts"))?;
        fs::create_dir_all(root.join("sessions"))?;

        // Resume id assignment after the highest id already on disk
        let mut max_id = 0;
        for entry in fs::read_dir(root.join("accounts"))? {
            let entry = entry?;
            if entry.path().extension().is_some_and(|e| e == "json") {
                let content = fs::read_to_string(entry.path())?;
                let account: Account = serde_json::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("corrupt account record {:?}: {e}", entry.path()))?;
                max_id = max_id.max(account.id);
            }
        }

        Ok(Self {
            root,
            next_id: std::sync::Arc::new(AtomicI64::new(max_id)),
        })
    }

    fn account_path(&self, email: &str) -> PathBuf {
        let key = URL_SAFE_NO_PAD.encode(email.as_bytes());
        self.root.join("accounts").join(format!("{key}.json"))
    }

    fn session_path(&self, email: &str) -> PathBuf {
        let key = URL_SAFE_NO_PAD.encode(email.as_bytes());
        self.root.join("sessions").join(format!("{key}.token"))
    }
}

fn unavailable(err: std::io::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl CredentialStore for FlatFileStore {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let path = self.account_path(&new.email);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let account = Account {
            id,
            name: new.name,
            email: new.email.clone(),
            password_hash: new.password_hash,
            role: new.role,
        };
        let json = serde_json::to_string_pretty(&account)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        // create_new fails atomically when the email already has a record
        let mut file = match tokio_fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::Duplicate(new.email));
            },
            Err(e) => return Err(unavailable(e)),
        };

        file.write_all(json.as_bytes()).await.map_err(unavailable)?;
        file.flush().await.map_err(unavailable)?;
        Ok(account)
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let path = self.account_path(email);
        let content = match tokio_fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(e)),
        };
        let account =
            serde_json::from_str(&content).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Some(account))
    }
}

#[async_trait]
impl RefreshSessionStore for FlatFileStore {
    async fn upsert(&self, email: &str, token_value: &str) -> Result<(), StoreError> {
        let path = self.session_path(email);
        let tmp = self
            .root
            .join("sessions")
            .join(format!(".tmp-{}", Uuid::new_v4()));

        tokio_fs::write(&tmp, token_value.as_bytes())
            .await
            .map_err(unavailable)?;
        // rename is the atomic replace; concurrent upserts race and the
        // last committed rename wins entirely
        tokio_fs::rename(&tmp, &path).await.map_err(unavailable)?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        let path = self.session_path(email);
        match tokio_fs::read_to_string(&path).await {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn delete_by_email(&self, email: &str) -> Result<(), StoreError> {
        let path = self.session_path(email);
        match tokio_fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(e)),
        }
    }
}
