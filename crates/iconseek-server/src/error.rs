use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use iconseek_search::{ErrorBody, SearchError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing query or API key")]
    MissingQueryOrKey,

    #[error("Failed to fetch icons")]
    UpstreamStatus(StatusCode),

    #[error("Failed to fetch icons")]
    UpstreamUnavailable,

    #[error("Favorite not found")]
    FavoriteNotFound,

    #[error("Invalid icon: {0}")]
    InvalidIcon(String),

    #[error("Rate limited. Try again in {0:?}")]
    RateLimited(Duration),
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::MissingQuery | SearchError::MissingApiKey => ApiError::MissingQueryOrKey,
            SearchError::Status { status, .. } => StatusCode::from_u16(status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .map(ApiError::UpstreamStatus)
                .unwrap_or(ApiError::UpstreamUnavailable),
            SearchError::Network(_) | SearchError::Decode(_) => ApiError::UpstreamUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingQueryOrKey | ApiError::InvalidIcon(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamStatus(status) => *status,
            ApiError::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::FavoriteNotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        };

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
