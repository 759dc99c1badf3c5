use axum::Router;

pub mod auth;
pub mod system;
pub mod users;

/// Routes reachable without an access token.
pub fn public_router() -> Router {
    Router::new()
        .merge(auth::public_router())
        .merge(users::router())
}

/// Routes that require an authenticated identity.
pub fn guarded_router() -> Router {
    auth::guarded_router()
}
