// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the `PetMarket` account service and its clients.
//! This module defines the account API request/response bodies and the
//! role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role.
///
/// A closed set: anything other than `USER` or `ADMIN` is rejected at the
/// deserialization boundary.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    /// Wire representation, as stored in token claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/accounts/register`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email, unique per account
    pub email: String,
    /// Plaintext password; hashed server-side, never stored
    pub password: String,
    /// Requested role; defaults to `USER` when absent
    pub role: Option<Role>,
}

/// Public view of an account. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Body of `POST /api/accounts/login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Access/refresh token pair returned by login and refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential for authorizing requests
    pub access_token: String,
    /// Long-lived credential exchanged for a new pair
    pub refresh_token: String,
}

/// Body of `POST /api/accounts/refresh`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}
