use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use iconseek_core::{Change, FavoriteId, IconRecord};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/toggle", post(toggle_favorite))
        .route("/api/favorites/{id}", delete(remove_favorite))
}

#[derive(Serialize)]
struct FavoritesResponse {
    ids: Vec<FavoriteId>,
    icons: Vec<IconRecord>,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    icon: IconRecord,
    /// Position of the icon in the list it was picked from.
    index: Option<usize>,
}

/// `{"status": "added" | "removed" | "exists", "id": ...}`
#[derive(Serialize)]
struct ChangeResponse<'a> {
    status: &'static str,
    id: &'a FavoriteId,
}

impl<'a> From<&'a Change> for ChangeResponse<'a> {
    fn from(change: &'a Change) -> Self {
        let status = match change {
            Change::Added(_) => "added",
            Change::Removed(_) => "removed",
            Change::Unchanged(_) => "exists",
        };
        Self {
            status,
            id: change.id(),
        }
    }
}

/// GET /api/favorites - All favorites in insertion order.
async fn list_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let favorites = state.favorites.lock().await;
    Json(FavoritesResponse {
        ids: favorites.ids(),
        icons: favorites.records().to_vec(),
    })
}

/// POST /api/favorites - Add an icon. Adding an existing favorite is a no-op.
async fn add_favorite(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Json(icon): Json<IconRecord>,
) -> Response {
    if let Err(e) = state.write_limiter.admit(addr.ip()) {
        return e.into_response();
    }

    let change = state.favorites.lock().await.add(icon);
    let status = if change.is_changed() {
        tracing::info!("Added favorite {}", change.id());
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(ChangeResponse::from(&change))).into_response()
}

/// POST /api/favorites/toggle - Add the icon if absent, remove it otherwise.
async fn toggle_favorite(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<ToggleRequest>,
) -> Response {
    if let Err(e) = state.write_limiter.admit(addr.ip()) {
        return e.into_response();
    }

    let change = state.favorites.lock().await.toggle_at(req.icon, req.index);
    tracing::info!("Toggled favorite {}: {:?}", change.id(), change);
    Json(ChangeResponse::from(&change)).into_response()
}

/// DELETE /api/favorites/{id} - Remove a favorite by identifier.
async fn remove_favorite(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Path(id): Path<String>,
) -> Response {
    if let Err(e) = state.write_limiter.admit(addr.ip()) {
        return e.into_response();
    }

    let change = state.favorites.lock().await.remove(&id);
    if !change.is_changed() {
        return ApiError::FavoriteNotFound.into_response();
    }
    tracing::info!("Removed favorite {}", id);
    Json(ChangeResponse::from(&change)).into_response()
}
