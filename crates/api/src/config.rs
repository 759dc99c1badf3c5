//! Environment-backed configuration.
//!
//! Everything is read and validated exactly once at startup; a missing or
//! malformed security setting is fatal. Defaults exist only for values that
//! are safe to default (bind address, TTLs, reaper cadence), never for key
//! material.

use std::collections::HashMap;

use passgate_auth::{BcryptSetting, TokenConfig};
use passgate_core::{AuthError, AuthResult};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ACCESS_TTL_HOURS: i64 = 1;
const DEFAULT_REFRESH_TTL_HOURS: i64 = 720;
const DEFAULT_VERIFICATION_TTL_MINUTES: i64 = 10;
const DEFAULT_RESET_TTL_MINUTES: i64 = 15;
/// One week, matching the reference cleanup cadence.
const DEFAULT_REAPER_INTERVAL_SECS: u64 = 604_800;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub application_name: String,
    pub bind_addr: String,
    /// When absent the process runs on in-memory stores.
    pub database_url: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub private_key_pem: String,
    pub public_key_pem: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_hours: i64,
    pub verification_code_ttl_minutes: i64,
    pub reset_code_ttl_minutes: i64,
    pub bcrypt: BcryptSetting,
    pub reaper_interval_secs: u64,
    pub from_email: String,
    /// When absent emails are logged instead of delivered.
    pub email_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> AuthResult<Self> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build from an explicit variable map. Split out from `from_env` so
    /// configuration handling stays testable.
    pub fn from_vars(vars: &HashMap<String, String>) -> AuthResult<Self> {
        Ok(Self {
            application_name: get_or(vars, "APPLICATION_NAME", "passgate"),
            bind_addr: get_or(vars, "PASSGATE_BIND_ADDR", DEFAULT_BIND_ADDR),
            database_url: get(vars, "DATABASE_URL"),
            issuer: require(vars, "JWT_ISSUER")?,
            audience: require(vars, "JWT_AUDIENCE")?,
            private_key_pem: require(vars, "JWT_PRIVATE_KEY_PEM")?,
            public_key_pem: require(vars, "JWT_PUBLIC_KEY_PEM")?,
            access_ttl_hours: get_i64(
                vars,
                "ACCESS_TOKEN_EXPIRATION_IN_HOURS",
                DEFAULT_ACCESS_TTL_HOURS,
            )?,
            refresh_ttl_hours: get_i64(
                vars,
                "REFRESH_TOKEN_EXPIRATION_IN_HOURS",
                DEFAULT_REFRESH_TTL_HOURS,
            )?,
            verification_code_ttl_minutes: get_i64(
                vars,
                "VERIFICATION_CODE_EXPIRATION_IN_MINUTES",
                DEFAULT_VERIFICATION_TTL_MINUTES,
            )?,
            reset_code_ttl_minutes: get_i64(
                vars,
                "PASSWORD_RESET_CODE_EXPIRATION_IN_MINUTES",
                DEFAULT_RESET_TTL_MINUTES,
            )?,
            bcrypt: BcryptSetting::parse(vars.get("BCRYPT_SALT").map(String::as_str))?,
            reaper_interval_secs: get_u64(
                vars,
                "SESSION_REAPER_INTERVAL_SECS",
                DEFAULT_REAPER_INTERVAL_SECS,
            )?,
            from_email: get_or(vars, "FROM_EMAIL", "no-reply@passgate.local"),
            email_api_key: get(vars, "RESEND_API_KEY"),
        })
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            access_ttl_hours: self.access_ttl_hours,
            refresh_ttl_hours: self.refresh_ttl_hours,
            private_key_pem: self.private_key_pem.clone(),
            public_key_pem: self.public_key_pem.clone(),
        }
    }
}

fn get(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
}

fn get_or(vars: &HashMap<String, String>, key: &str, default: &str) -> String {
    get(vars, key).unwrap_or_else(|| default.to_string())
}

fn require(vars: &HashMap<String, String>, key: &str) -> AuthResult<String> {
    get(vars, key).ok_or_else(|| AuthError::config(format!("{key} is not defined")))
}

fn get_i64(vars: &HashMap<String, String>, key: &str, default: i64) -> AuthResult<i64> {
    match get(vars, key) {
        None => Ok(default),
        Some(raw) => {
            let value: i64 = raw
                .parse()
                .map_err(|_| AuthError::config(format!("{key} must be an integer")))?;
            if value <= 0 {
                return Err(AuthError::config(format!("{key} must be positive")));
            }
            Ok(value)
        }
    }
}

fn get_u64(vars: &HashMap<String, String>, key: &str, default: u64) -> AuthResult<u64> {
    match get(vars, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AuthError::config(format!("{key} must be a non-negative integer"))),
    }
}
