//! `/users` route handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors, AppServices};

pub fn router() -> Router {
    Router::new().route("/users/signup", post(signup))
}

async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> axum::response::Response {
    for check in [
        dto::validate_name("firstName", &body.first_name),
        dto::validate_name("lastName", &body.last_name),
        dto::validate_email(&body.email),
        dto::validate_password(&body.password),
    ] {
        if let Err(e) = check {
            return errors::to_response(&e);
        }
    }

    match services
        .users
        .signup(
            body.first_name.trim(),
            body.last_name.trim(),
            body.email.trim(),
            &body.password,
        )
        .await
    {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => errors::to_response(&e),
    }
}
