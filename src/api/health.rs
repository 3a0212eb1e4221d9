use axum::{http::StatusCode, response::IntoResponse};

/// GET /healthz - Liveness check; does not touch the price source
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
