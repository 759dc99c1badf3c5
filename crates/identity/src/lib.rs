//! `passgate-identity` — orchestration services for the authentication core.
//!
//! Composes the pure primitives from `passgate-auth` with the store ports
//! defined here: login/refresh/logout session management, email-verification
//! and password-reset code workflows, signup, and the expired-session reaper.
//!
//! Storage and delivery are behind narrow async traits; this crate owns the
//! session and code records (no other component creates or deletes them).

pub mod events;
pub mod reaper;
pub mod service;
pub mod store;
pub mod user;
pub mod users;
pub mod verification;

#[cfg(test)]
pub(crate) mod test_support;

pub use events::UserCreated;
pub use reaper::ExpiredSessionReaper;
pub use service::{AuthService, AuthTokens, DeviceContext, LoginOutcome};
pub use store::{
    CodeStore, EmailMessage, IdentityStore, NotificationSender, SessionStore, StoreError,
    StoreResult,
};
pub use user::{CodePurpose, CodeRecord, PublicUser, Session, SessionSummary, User};
pub use users::UserService;
pub use verification::VerificationService;
