// ============================
// petmarket-backend-lib/src/config.rs
// ============================
//! Configuration management.
use crate::auth::password::PasswordRequirements;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Token signing and lifetime settings
    pub auth: AuthSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
}

/// Token signing and lifetime settings.
///
/// The signing secret is injected here once at startup and never
/// re-derived per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Base64-encoded signing secret
    pub secret: String,
    /// Access token TTL in seconds
    pub access_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            auth: AuthSettings::default(),
            password_requirements: PasswordRequirements::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            // "petmarket-dev-secret-key-32-bytes!" -- override in deployment
            secret: "cGV0bWFya2V0LWRldi1zZWNyZXQta2V5LTMyLWJ5dGVzIQ==".to_string(),
            access_ttl_secs: 60 * 60 * 24,      // 24 hours
            refresh_ttl_secs: 60 * 60 * 24 * 2, // 48 hours
        }
    }
}

impl Settings {
    /// Load settings from config files and environment variables
    pub fn load() -> Result<Self> {
        Self::figment().extract().map_err(Into::into)
    }

    /// Load settings with an explicit config file path merged in
    pub fn load_from(path: &str) -> Result<Self> {
        Self::figment()
            .merge(Toml::file(path))
            .extract()
            .map_err(Into::into)
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"))
            .merge(Yaml::file("config.yaml"))
            .merge(Json::file("config.json"))
            .merge(Env::prefixed("PETMARKET_").split("__"))
    }

    /// Check settings for values that cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            anyhow::bail!("invalid log level: {}", self.log_level);
        }
        if self.auth.access_ttl_secs == 0 {
            anyhow::bail!("access token TTL must be positive");
        }
        if self.auth.refresh_ttl_secs <= self.auth.access_ttl_secs {
            anyhow::bail!("refresh token TTL must exceed access token TTL");
        }
        if self.password_requirements.min_length < 8 {
            anyhow::bail!("minimum password length must be at least 8");
        }
        Ok(())
    }
}

/// Load settings from various sources
pub fn load_settings() -> Result<Settings> {
    let settings = Settings::load()?;
    settings.validate()?;
    Ok(settings)
}
