//! `/auth` route handlers.
//!
//! Login, refresh and the code workflows are public; everything touching an
//! existing identity runs behind the bearer middleware plus an explicit
//! permission check. Refresh deliberately does not use the bearer token: the
//! access token it would present is the thing being replaced.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use passgate_auth::{Action, Ownership, RequiredPermission};
use passgate_core::{AuthError, DeviceId, SessionId};
use passgate_identity::DeviceContext;

use crate::app::{dto, errors};
use crate::app::AppServices;
use crate::authz;
use crate::context::AuthContext;

const SESSIONS_READ: &[RequiredPermission] =
    &[RequiredPermission::new("RefreshToken", Action::Read, Ownership::Own)];
const SESSIONS_DELETE: &[RequiredPermission] =
    &[RequiredPermission::new("RefreshToken", Action::Delete, Ownership::Own)];
const PROFILE_READ: &[RequiredPermission] =
    &[RequiredPermission::new("User", Action::Read, Ownership::Own)];
const PROFILE_UPDATE: &[RequiredPermission] =
    &[RequiredPermission::new("User", Action::Update, Ownership::Own)];

const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
const DEVICE_ID_HEADER: &str = "x-device-id";

pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh))
        .route("/auth/email-verification/send", post(send_verification))
        .route("/auth/email-verification/verify", post(verify_email))
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
}

pub fn guarded_router() -> Router {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/sessions", get(list_sessions))
        .route("/auth/sessions/:session_id", delete(revoke_session))
        .route("/auth/password/change", post(change_password))
        .route("/auth/me", get(me))
}

async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    if let Err(e) = dto::validate_email(&body.email) {
        return errors::to_response(&e);
    }

    let device = DeviceContext {
        device_name: body.device_name.or_else(|| user_agent(&headers)),
    };

    match services.auth.login(&body.email, &body.password, device).await {
        Ok(outcome) => Json(dto::LoginResponse {
            auth: outcome.auth.into(),
            user: outcome.user,
        })
        .into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let token = match header_value(&headers, REFRESH_TOKEN_HEADER) {
        Some(token) => token,
        None => return errors::to_response(&AuthError::Unauthorized),
    };

    let device = DeviceContext {
        device_name: user_agent(&headers),
    };

    match services.auth.refresh_token(&token, device).await {
        Ok(tokens) => Json(dto::AuthPayload::from(tokens)).into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&ctx, SESSIONS_DELETE) {
        return resp;
    }

    let token = match header_value(&headers, REFRESH_TOKEN_HEADER) {
        Some(token) => token,
        None => return errors::to_response(&AuthError::Unauthorized),
    };
    let device_id = match header_value(&headers, DEVICE_ID_HEADER)
        .and_then(|raw| DeviceId::from_str(&raw).ok())
    {
        Some(id) => id,
        None => return errors::to_response(&AuthError::Unauthorized),
    };

    match services.auth.logout(ctx.user_id(), device_id, &token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn list_sessions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&ctx, SESSIONS_READ) {
        return resp;
    }

    match services.auth.list_active_sessions(ctx.user_id()).await {
        Ok(sessions) => Json(dto::SessionsResponse { sessions }).into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn revoke_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(session_id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&ctx, SESSIONS_DELETE) {
        return resp;
    }

    let session_id = match SessionId::from_str(&session_id) {
        Ok(id) => id,
        Err(e) => return errors::to_response(&e),
    };

    match services.auth.revoke_session(ctx.user_id(), session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn send_verification(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::EmailRequest>,
) -> axum::response::Response {
    if let Err(e) = dto::validate_email(&body.email) {
        return errors::to_response(&e);
    }

    match services
        .verification
        .request_email_verification(&body.email)
        .await
    {
        Ok(code_id) => Json(dto::CodeRequestedResponse { code_id }).into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::VerifyEmailRequest>,
) -> axum::response::Response {
    if let Err(e) = dto::validate_code(&body.code) {
        return errors::to_response(&e);
    }

    match services
        .verification
        .verify_email(body.code_id, &body.code)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn forgot_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::EmailRequest>,
) -> axum::response::Response {
    if let Err(e) = dto::validate_email(&body.email) {
        return errors::to_response(&e);
    }

    match services
        .verification
        .request_password_reset(&body.email)
        .await
    {
        Ok(code_id) => Json(dto::CodeRequestedResponse { code_id }).into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetPasswordRequest>,
) -> axum::response::Response {
    if let Err(e) = dto::validate_code(&body.code) {
        return errors::to_response(&e);
    }
    if let Err(e) = dto::validate_password(&body.new_password) {
        return errors::to_response(&e);
    }

    match services
        .verification
        .reset_password(body.code_id, &body.code, &body.new_password)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&ctx, PROFILE_UPDATE) {
        return resp;
    }
    if let Err(e) = dto::validate_password(&body.new_password) {
        return errors::to_response(&e);
    }

    match services
        .auth
        .change_password(ctx.user_id(), &body.new_password)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::to_response(&e),
    }
}

async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&ctx, PROFILE_READ) {
        return resp;
    }

    match services.users.profile(ctx.user_id()).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => errors::to_response(&e),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "user-agent")
}
