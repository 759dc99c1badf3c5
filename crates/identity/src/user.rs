//! Domain records owned by the identity services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use passgate_auth::Role;
use passgate_core::{CodeId, DeviceId, SessionId, UserId};

/// A user account as persisted.
///
/// Never deleted by this core; mutated on verification, password change and
/// activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Bcrypt hash; the cleartext secret never touches a store.
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The caller-visible projection; never exposes the hash.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
            is_email_verified: self.is_email_verified,
            is_active: self.is_active,
        }
    }
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
    pub is_active: bool,
}

/// A refresh-token session, one per device.
///
/// Expiry is fixed at creation and never extended: refresh creates a new
/// session and invalidates the old one (rotation, not renewal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    /// Opaque refresh-token value, unique across sessions.
    pub token: String,
    pub device_id: DeviceId,
    pub device_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Inclusive at the boundary: a session at exactly its expiry instant is
    /// already sweepable, so it must not be refreshable either.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// What session listings expose to the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub device_name: String,
    pub device_id: DeviceId,
    pub created_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            device_name: session.device_name.clone(),
            device_id: session.device_id,
            created_at: session.created_at,
        }
    }
}

/// Which workflow a code record belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    EmailVerification,
    PasswordReset,
}

impl CodePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePurpose::EmailVerification => "email_verification",
            CodePurpose::PasswordReset => "password_reset",
        }
    }
}

/// A persisted verification/reset code.
///
/// Not deleted on failed attempts; stays usable until expiry or until the
/// owning identity reaches the goal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub id: CodeId,
    pub user_id: UserId,
    pub code: String,
    pub purpose: CodePurpose,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CodeRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
