use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::AppServices;

/// Liveness probe.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": services.application_name,
    }))
}
