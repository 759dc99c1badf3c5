//! Request/response DTOs and input validation.
//!
//! Wire casing is camelCase throughout, matching the original client
//! contract. Validation mirrors the reference rules: well-formed email,
//! password of at least 8 chars with an uppercase letter, a digit and a
//! special character, codes of exactly six digits.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use passgate_core::{AuthError, AuthResult, CodeId, DeviceId};
use passgate_identity::{AuthTokens, PublicUser, SessionSummary};

const MIN_PASSWORD_LEN: usize = 8;
const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
    /// Seconds until the access token expires.
    pub access_token_expires_in: i64,
    pub refresh_token: String,
    /// Seconds until the refresh token expires.
    pub refresh_token_expires_in: i64,
    pub device_id: DeviceId,
    pub device_name: String,
}

impl From<AuthTokens> for AuthPayload {
    fn from(tokens: AuthTokens) -> Self {
        let now = Utc::now();
        Self {
            access_token: tokens.access_token,
            access_token_expires_in: (tokens.access_token_expires_at - now).num_seconds(),
            refresh_token: tokens.refresh_token,
            refresh_token_expires_in: (tokens.refresh_token_expires_at - now).num_seconds(),
            device_id: tokens.device_id,
            device_name: tokens.device_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth: AuthPayload,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequestedResponse {
    pub code_id: CodeId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub code_id: CodeId,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub code_id: CodeId,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

pub fn validate_email(email: &str) -> AuthResult<()> {
    let trimmed = email.trim();
    let mut parts = trimmed.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(AuthError::validation("email must be a valid address")),
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || trimmed.contains(' ') {
        return Err(AuthError::validation("email must be a valid address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::validation(
            "password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::validation("password must contain a digit"));
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(AuthError::validation(
            "password must contain a special character",
        ));
    }
    Ok(())
}

pub fn validate_code(code: &str) -> AuthResult<()> {
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::validation("code must be exactly six digits"));
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
