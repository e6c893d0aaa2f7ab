//! Axum router configuration

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{
    conversion_stats, convert_upload, health_check, probe_upload, version_check, X_CONVERSION,
    X_CONVERSION_ID,
};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.convert.max_upload_bytes();

    let mut router = Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        // Debug endpoints
        .route("/debug/stats", get(conversion_stats))
        // Conversion
        .route("/convert", post(convert_upload))
        .route("/probe", post(probe_upload))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    if state.config.cors_enabled {
        // Browsers read the download name and conversion path from the
        // response, so those headers have to be exposed explicitly.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
            .expose_headers([header::CONTENT_DISPOSITION, X_CONVERSION, X_CONVERSION_ID])
            .allow_private_network(true)
            .max_age(Duration::from_secs(3600));
        router = router.layer(cors);
    }

    router.with_state(state)
}
