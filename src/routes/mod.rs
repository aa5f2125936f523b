// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::exporter::Exporter;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) exporter: Arc<Exporter>,
    pub(crate) metrics_path: String,
}

pub fn app(exporter: Arc<Exporter>, config: &AppConfig) -> Router {
    let metrics_path = config.server.metrics_path.clone();
    let state = AppState {
        exporter,
        metrics_path: metrics_path.clone(),
    };
    Router::new()
        .route("/", get(http::index_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route(&metrics_path, get(http::metrics_handler)) // GET /metrics
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
