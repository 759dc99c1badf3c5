//! `passgate-core` — shared foundation for the authentication core.
//!
//! Strongly-typed identifiers, the error taxonomy every layer speaks, and the
//! clock abstraction that keeps time-dependent logic deterministic in tests.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, SystemClock};
pub use error::{AuthError, AuthResult};
pub use id::{CodeId, DeviceId, SessionId, UserId};
