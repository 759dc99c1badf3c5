//! Consistent JSON error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use passgate_core::AuthError;

/// Map a domain error to its HTTP response.
///
/// Internal and configuration failures share one generic body; details stay
/// in the logs.
pub fn to_response(err: &AuthError) -> axum::response::Response {
    let status = status_for(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        return json_error(
            status,
            AuthError::Internal.kind(),
            AuthError::Internal.to_string(),
        );
    }
    json_error(status, err.kind(), err.to_string())
}

fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials
        | AuthError::AlreadySignedUp
        | AuthError::AlreadyVerified
        | AuthError::AlreadyUsed
        | AuthError::CodeMismatch
        | AuthError::CodeExpired
        | AuthError::InvalidId(_)
        | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::Unauthorized | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::NotFound => StatusCode::NOT_FOUND,
        AuthError::AccountInactive { .. } => StatusCode::LOCKED,
        AuthError::Config(_) | AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "code": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
