// src/routes/mod.rs
pub mod validate;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use validate::{
    cleanup_preset_handler, get_config_handler, get_endpoints_handler, get_metrics_handler,
    validate_handler,
};

pub fn create_router() -> Router<SharedState> {
    let api_routes = Router::new()
        .route("/config", get(get_config_handler))
        .route("/endpoints", get(get_endpoints_handler))
        .route("/validate/{kind}", post(validate_handler))
        .route("/presets/cleanup", post(cleanup_preset_handler))
        .route("/metrics", get(get_metrics_handler));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}
