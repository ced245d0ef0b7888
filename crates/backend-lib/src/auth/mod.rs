// ============================
// petmarket-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod extract;
pub mod password;
mod service;
pub mod token;

pub use extract::IdentityContext;
pub use password::{
    hash_password, hash_password_secure, validate_password_strength, verify_password,
    PasswordRequirements, MIN_PASSWORD_LENGTH,
};
pub use service::SessionService;
pub use token::{Claims, TokenCodec, TokenKind};
