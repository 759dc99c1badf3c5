//! Access-token claim set and verification errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use passgate_core::UserId;

use crate::rbac::Role;

/// Claims carried by a signed access token.
///
/// Stateless: never persisted, validity is determined purely by signature and
/// the timestamps below at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id).
    pub sub: UserId,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Role granted to the subject when the token was issued.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Verification failures, kept distinct so callers can tell expiry
/// (retry with a refresh token) from tampering (reject outright).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token is malformed or has an invalid signature")]
    Malformed,
}
