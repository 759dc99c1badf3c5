//! Role-based access control: the static permission table and the pure
//! authorization check every protected operation runs through.

pub mod authorize;
pub mod permissions;

pub use authorize::{authorize, AuthenticatedUser, RequiredPermission};
pub use permissions::{is_allowed, Action, Ownership, PermissionRule, Role, PERMISSION_SCHEMA};
