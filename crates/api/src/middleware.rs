//! Bearer-token authentication middleware.
//!
//! Verifies the access token and attaches an [`AuthContext`] to the request.
//! Authorization (what the identity may do) happens per-route in `authz`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use passgate_auth::TokenIssuer;
use passgate_core::AuthError;

use crate::app::errors;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenIssuer>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .tokens
        .verify_access_token(token, Utc::now())
        .map_err(|e| {
            tracing::debug!(reason = %e, "access token rejected");
            errors::to_response(&AuthError::Unauthorized)
        })?;

    req.extensions_mut()
        .insert(AuthContext::new(claims.sub, claims.role));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| errors::to_response(&AuthError::Unauthorized))?;

    let header = header
        .to_str()
        .map_err(|_| errors::to_response(&AuthError::Unauthorized))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| errors::to_response(&AuthError::Unauthorized))?
        .trim();

    if token.is_empty() {
        return Err(errors::to_response(&AuthError::Unauthorized));
    }

    Ok(token)
}
