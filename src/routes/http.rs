// GET handlers: index, version, metrics

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use super::AppState;
use crate::version::{NAME, VERSION};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// GET / — static index page pointing at the metrics endpoint.
pub(super) async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(format!(
        "<h1>LXC metrics</h1><br><a href=\"{0}\">Metrics</a>",
        state.metrics_path
    ))
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /metrics — one fresh collection pass per request; 503 when the host layer is unavailable.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.exporter.scrape().await {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            format!("{}\n", e),
        )
            .into_response(),
    }
}
