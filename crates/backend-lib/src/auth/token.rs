// ============================
// petmarket-backend-lib/src/auth/token.rs
// ============================
//! Signed token issuance and verification.
//!
//! Access and refresh tokens are structurally identical claim sets
//! distinguished only by `kind`; `verify` checks the kind before trusting
//! any other claim, so a stolen access token can never be replayed as a
//! refresh token or vice versa.
use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use petmarket_common::{Role, TokenPair};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_SECRET_BYTES: usize = 32;

/// Token kind discriminator carried in the claims
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[serde(rename = "access")]
    Access,
    #[serde(rename = "refresh")]
    Refresh,
}

/// Signed facts encoded in a token. Never persisted; only the refresh
/// token's opaque string is written to storage.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// Subject: the account email
    pub sub: String,
    /// Account id, carried so request authentication needs no storage read
    pub uid: i64,
    pub role: Role,
    pub kind: TokenKind,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Unique token id; keeps two tokens minted within the same second
    /// from serializing identically, which rotation depends on
    pub jti: String,
}

/// Signs and verifies compact claim sets with a process-wide key.
///
/// Built once at startup from configuration; never re-derived per request.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from a base64-encoded secret
    pub fn from_base64_secret(secret: &str) -> anyhow::Result<Self> {
        let key = STANDARD
            .decode(secret)
            .map_err(|e| anyhow::anyhow!("signing secret is not valid base64: {e}"))?;
        if key.len() < MIN_SECRET_BYTES {
            anyhow::bail!("signing secret must decode to at least {MIN_SECRET_BYTES} bytes");
        }

        // Expiry is compared inclusively below; the library's own leeway-based
        // check is disabled so the boundary stays exact.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        Ok(Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
            validation,
        })
    }

    /// Serialize, sign and compact a claim set
    pub fn issue(
        &self,
        sub: &str,
        uid: i64,
        role: Role,
        kind: TokenKind,
        ttl_secs: u64,
    ) -> Result<String, AppError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            uid,
            role,
            kind,
            iat,
            exp: iat + ttl_secs as i64,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
    }

    /// Issue a matched access/refresh pair for one subject
    pub fn issue_pair(
        &self,
        sub: &str,
        uid: i64,
        role: Role,
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue(sub, uid, role, TokenKind::Access, access_ttl_secs)?,
            refresh_token: self.issue(sub, uid, role, TokenKind::Refresh, refresh_ttl_secs)?,
        })
    }

    /// Verify a token's signature, kind and expiry, in that order
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        self.verify_at(token, expected, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, expected: TokenKind, now: i64) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(classify_decode_error)?;
        let claims = data.claims;

        if claims.kind != expected {
            return Err(AppError::WrongTokenKind);
        }
        // `exp == now` is already expired
        if claims.exp <= now {
            return Err(AppError::TokenExpired);
        }
        Ok(claims)
    }
}

fn classify_decode_error(err: jsonwebtoken::errors::Error) -> AppError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => AppError::InvalidSignature,
        _ => AppError::TokenMalformed,
    }
}
