use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    favorites: usize,
    upstream_configured: bool,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Degraded while the last favorites write failed to reach storage.
async fn ready(State(state): State<AppState>) -> Response {
    let favorites = state.favorites.lock().await;
    let dirty = favorites.is_dirty();
    let body = ReadyResponse {
        status: if dirty { "degraded" } else { "ok" },
        favorites: favorites.count(),
        upstream_configured: state.upstream.has_api_key(),
    };
    let status = if dirty {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(body)).into_response()
}
