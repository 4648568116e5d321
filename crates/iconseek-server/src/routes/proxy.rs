use axum::{
    extract::{ConnectInfo, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use iconseek_search::SearchError;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/icons", get(search_icons))
}

#[derive(Deserialize)]
pub struct IconsQuery {
    q: Option<String>,
}

/// GET /api/icons?q=<query> - Forward a search to the upstream API.
/// The upstream JSON body is returned unchanged.
async fn search_icons(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Query(query): Query<IconsQuery>,
) -> Response {
    if let Err(e) = state.search_limiter.admit(addr.ip()) {
        return e.into_response();
    }

    let q = query.q.unwrap_or_default();
    match state.upstream.fetch_raw(&q).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            match &e {
                SearchError::MissingQuery | SearchError::MissingApiKey => {
                    tracing::debug!("Rejected icon search: {}", e)
                }
                SearchError::Status { .. } => tracing::warn!("Upstream icon search failed: {}", e),
                SearchError::Network(_) | SearchError::Decode(_) => {
                    tracing::error!("Upstream icon search unavailable: {}", e)
                }
            }
            ApiError::from(e).into_response()
        }
    }
}
