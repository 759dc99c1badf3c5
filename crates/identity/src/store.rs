//! Store and delivery ports consumed by the identity services.
//!
//! Backing implementations live in `passgate-infra`. "Not found" is distinct
//! from a transport failure here; the services normalize both to the same
//! external error before anything reaches a caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use passgate_core::{CodeId, DeviceId, SessionId, UserId};

use crate::user::{CodeRecord, Session, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted user accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Fails `Duplicate` when the email is already taken.
    async fn create(&self, user: &User) -> StoreResult<()>;

    /// Fails `NotFound` when the user does not exist.
    async fn update(&self, user: &User) -> StoreResult<()>;
}

/// Persisted refresh-token sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &Session) -> StoreResult<()>;

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>>;

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>>;

    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<Session>>;

    /// Returns the number of deleted records (0 or 1).
    async fn delete_by_id(&self, id: SessionId) -> StoreResult<u64>;

    /// Returns the number of deleted records.
    async fn delete_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> StoreResult<u64>;

    /// Bulk-delete every session with `expires_at <= now`. Returns the count.
    async fn delete_all_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Persisted verification/reset codes.
#[async_trait]
pub trait CodeStore: Send + Sync {
    async fn create(&self, record: &CodeRecord) -> StoreResult<()>;

    async fn find_by_id(&self, id: CodeId) -> StoreResult<Option<CodeRecord>>;
}

/// A rendered transactional email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound notification delivery.
///
/// Fire-and-forget from the core's perspective: delivery failure is logged by
/// the caller and never surfaced to the requester.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}
