//! The static permission table.
//!
//! Process-wide and immutable after initialization: rules are consulted,
//! never mutated. Safe for unsynchronized concurrent reads.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use passgate_core::AuthError;

/// Role granted to a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AuthError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// Action a caller wants to perform on a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

/// Whether the action targets the caller's own resource or any resource of
/// that type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    Own,
    Any,
}

/// One row of the permission table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRule {
    pub resource: &'static str,
    pub action: Action,
    pub ownership: Ownership,
    pub roles: &'static [Role],
}

const BOTH: &[Role] = &[Role::Admin, Role::User];

/// The seeded rule set: both roles may act on their own users and sessions,
/// nobody may act on anyone else's.
pub const PERMISSION_SCHEMA: &[PermissionRule] = &[
    PermissionRule { resource: "User", action: Action::Read, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "User", action: Action::Create, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "User", action: Action::Update, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "User", action: Action::Delete, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "RefreshToken", action: Action::Read, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "RefreshToken", action: Action::Create, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "RefreshToken", action: Action::Update, ownership: Ownership::Own, roles: BOTH },
    PermissionRule { resource: "RefreshToken", action: Action::Delete, ownership: Ownership::Own, roles: BOTH },
];

/// Pure table lookup: true iff a rule matches (resource, action, ownership)
/// and its allowed-roles set contains `role`.
pub fn is_allowed(role: Role, resource: &str, action: Action, ownership: Ownership) -> bool {
    PERMISSION_SCHEMA.iter().any(|rule| {
        rule.resource == resource
            && rule.action == action
            && rule.ownership == ownership
            && rule.roles.contains(&role)
    })
}
