//! The authorization decision applied after authentication.
//!
//! No IO, no panics, no partial grants: every declared requirement must pass.

use passgate_core::{AuthError, AuthResult, UserId};

use super::permissions::{is_allowed, Action, Ownership, Role};

/// The identity resolved from a verified access token.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

/// A permission a protected operation declares it needs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequiredPermission {
    pub resource: &'static str,
    pub action: Action,
    pub ownership: Ownership,
}

impl RequiredPermission {
    pub const fn new(resource: &'static str, action: Action, ownership: Ownership) -> Self {
        Self {
            resource,
            action,
            ownership,
        }
    }
}

/// Authorize an identity against a set of required permissions.
///
/// Fails `Unauthorized` when no identity is present on the call context and
/// `Forbidden` when any single requirement is not granted to the identity's
/// role (all-of semantics; there is no any-of mode).
pub fn authorize(
    identity: Option<&AuthenticatedUser>,
    required: &[RequiredPermission],
) -> AuthResult<()> {
    let identity = identity.ok_or(AuthError::Unauthorized)?;

    let denied = required.iter().find(|perm| {
        !is_allowed(identity.role, perm.resource, perm.action, perm.ownership)
    });

    if let Some(perm) = denied {
        tracing::warn!(
            role = %identity.role,
            resource = perm.resource,
            action = ?perm.action,
            ownership = ?perm.ownership,
            "permission denied"
        );
        return Err(AuthError::forbidden(identity.role.as_str()));
    }

    Ok(())
}
