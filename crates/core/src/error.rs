//! Error taxonomy shared by every layer of the authentication core.
//!
//! Keep this focused on the stable, caller-visible failure kinds. Storage and
//! infrastructure failures are logged with detail where they happen and then
//! downgraded into one of these before they reach a response body.

use thiserror::Error;

/// Result type used across the authentication core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Caller-visible failure kinds.
///
/// `Display` output is safe to return to clients; it never carries storage
/// detail, stack traces or internal identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately one variant for both so
    /// responses cannot be used for account enumeration.
    #[error("Invalid credentials provided, please try again with correct credentials.")]
    InvalidCredentials,

    /// The account exists but may not log in yet.
    #[error("{}", if *.email_verified {
        "Your account has been deactivated, please contact support."
    } else {
        "Your email address has not been verified yet, please verify it first."
    })]
    AccountInactive { email_verified: bool },

    /// Missing/invalid token or session, or a lookup the caller may not probe.
    #[error("Unauthorized")]
    Unauthorized,

    /// The presented refresh token matched a session that is past its expiry.
    #[error("Refresh token is invalid or expired, please login again.")]
    InvalidRefreshToken,

    /// Signup attempted with an email that already has an account.
    #[error("User has already signed up")]
    AlreadySignedUp,

    /// Authenticated, but the role is not permitted to perform the action.
    #[error("User with role {role} does not have permission to perform this action.")]
    Forbidden { role: String },

    /// Verification/reset record absent.
    #[error("Not found")]
    NotFound,

    /// The email address was already verified.
    #[error("Email address is already verified")]
    AlreadyVerified,

    /// The reset code's goal state is already satisfied.
    #[error("Code has already been used")]
    AlreadyUsed,

    /// Supplied code does not match the stored one.
    #[error("The provided code is incorrect")]
    CodeMismatch,

    /// The code was correct but past its expiry.
    #[error("The provided code has expired")]
    CodeExpired,

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A request field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Missing or malformed security configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Downgraded infrastructure failure. The cause has already been logged.
    #[error("Something went wrong, please try again later.")]
    Internal,
}

impl AuthError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn forbidden(role: impl Into<String>) -> Self {
        Self::Forbidden { role: role.into() }
    }

    /// Stable machine-readable kind, paired with the human message in
    /// response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "InvalidCredentials",
            Self::AccountInactive { .. } => "AccountInactive",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidRefreshToken => "InvalidRefreshToken",
            Self::AlreadySignedUp => "UserAlreadySignedUp",
            Self::Forbidden { .. } => "Forbidden",
            Self::NotFound => "NotFound",
            Self::AlreadyVerified => "AlreadyVerified",
            Self::AlreadyUsed => "AlreadyUsed",
            Self::CodeMismatch => "CodeMismatch",
            Self::CodeExpired => "CodeExpired",
            Self::InvalidId(_) => "InvalidId",
            Self::Validation(_) => "ValidationError",
            Self::Config(_) => "ConfigError",
            Self::Internal => "InternalServerError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_message_depends_on_verified_flag() {
        let unverified = AuthError::AccountInactive {
            email_verified: false,
        };
        let deactivated = AuthError::AccountInactive {
            email_verified: true,
        };
        assert!(unverified.to_string().contains("verify"));
        assert!(deactivated.to_string().contains("contact support"));
        assert_eq!(unverified.kind(), deactivated.kind());
    }

    #[test]
    fn internal_error_leaks_nothing() {
        assert_eq!(
            AuthError::Internal.to_string(),
            "Something went wrong, please try again later."
        );
    }
}
