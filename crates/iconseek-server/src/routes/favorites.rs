use axum::{
    extract::{ConnectInfo, State},
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Form, Router,
};
use serde::Deserialize;

use iconseek_core::IconRecord;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/favorites/remove", post(remove_favorite))
}

#[derive(Deserialize)]
pub struct ToggleForm {
    /// The icon record as JSON, as rendered into the results page.
    icon: String,
    index: Option<usize>,
    return_to: Option<String>,
}

#[derive(Deserialize)]
pub struct RemoveForm {
    id: String,
}

/// POST /favorites/toggle - Form variant of the toggle API. Redirects back to
/// the page the form was submitted from.
async fn toggle_favorite(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Form(form): Form<ToggleForm>,
) -> Response {
    if let Err(e) = state.write_limiter.admit(addr.ip()) {
        return e.into_response();
    }

    let icon: IconRecord = match serde_json::from_str(&form.icon) {
        Ok(icon) => icon,
        Err(e) => return ApiError::InvalidIcon(e.to_string()).into_response(),
    };

    let change = state.favorites.lock().await.toggle_at(icon, form.index);
    tracing::info!("Toggled favorite {}: {:?}", change.id(), change);

    Redirect::to(&safe_return_path(form.return_to.as_deref())).into_response()
}

/// POST /favorites/remove - Remove by identifier and go back to the list.
async fn remove_favorite(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Form(form): Form<RemoveForm>,
) -> Response {
    if let Err(e) = state.write_limiter.admit(addr.ip()) {
        return e.into_response();
    }

    let change = state.favorites.lock().await.remove(&form.id);
    if change.is_changed() {
        tracing::info!("Removed favorite {}", form.id);
    }
    Redirect::to("/favorites").into_response()
}

/// Only same-site absolute paths are followed.
fn safe_return_path(return_to: Option<&str>) -> String {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/favorites".to_string(),
    }
}
