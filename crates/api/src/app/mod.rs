//! HTTP application wiring (axum router + services).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and validation
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use passgate_identity::{AuthService, UserService, VerificationService};

use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;

/// Services shared by the route handlers.
pub struct AppServices {
    pub auth: AuthService,
    pub users: UserService,
    pub verification: VerificationService,
    pub application_name: String,
}

/// Build the full HTTP router.
///
/// Guarded routes run behind the bearer-token middleware; login, refresh,
/// signup, the code workflows and the health probe stay public.
pub fn build_app(services: Arc<AppServices>, auth_state: AuthState) -> Router {
    let guarded = routes::guarded_router()
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(guarded)
        .layer(Extension(services))
}
