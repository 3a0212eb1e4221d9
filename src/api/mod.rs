pub mod dto;
pub mod error;
pub mod health;
pub mod plan;
pub mod prices;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, state::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    let api = Router::new()
        .route("/plan", post(plan::create_plan))
        .route("/prices", get(prices::get_prices));

    let mut router = Router::new()
        .nest("/api", api)
        .route("/healthz", get(health::healthz));

    let origins: Vec<HeaderValue> = cfg
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(cfg.server.request_timeout_secs),
                )),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
