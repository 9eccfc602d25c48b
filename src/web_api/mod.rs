//! WebAPI - HTTP and WebSocket Endpoints
//!
//! ## Responsibilities
//!
//! - Incident ingestion and history routes
//! - Live feed WebSocket
//! - Cross-cutting layers (CORS, tracing, body limit, dashboard files)

mod routes;

pub use routes::create_router;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::IntoResponse;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::models::{HealthResponse, StatusResponse};
use crate::state::AppState;

/// Full application: routes plus layers
pub fn build_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_body_bytes = state.config.max_body_bytes;

    let mut app = create_router(state);

    if let Some(dir) = static_dir {
        tracing::info!(static_dir = %dir.display(), "Static file serving enabled");
        let serve_dir = ServeDir::new(&dir).not_found_service(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(serve_dir);
    }

    app.layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_sec: state.started_at.elapsed().as_secs(),
    };

    Json(response)
}

/// Hub status endpoint
pub async fn hub_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        incident_count: state.store.count().await,
        capacity: state.store.capacity(),
        viewer_count: state.realtime.viewer_count().await,
    })
}
