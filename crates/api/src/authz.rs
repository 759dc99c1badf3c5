//! Per-route authorization guard.
//!
//! Routes state their required permissions explicitly and call this before
//! touching any service. The permission table itself lives in `passgate-auth`.

use axum::response::Response;

use passgate_auth::{authorize, AuthenticatedUser, RequiredPermission};

use crate::app::errors;
use crate::context::AuthContext;

/// Check that the request context satisfies every required permission.
pub fn require(ctx: &AuthContext, required: &[RequiredPermission]) -> Result<(), Response> {
    let user = AuthenticatedUser {
        user_id: ctx.user_id(),
        role: ctx.role(),
    };
    authorize(Some(&user), required).map_err(|e| errors::to_response(&e))
}
