use thiserror::Error;

/// Error type for icon search operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Missing query")]
    MissingQuery,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("HTTP error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Short message suitable for showing on a page.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::MissingQuery => "Enter a search term".to_string(),
            SearchError::MissingApiKey => "Icon search is not configured".to_string(),
            SearchError::Status { status, message }
                if !message.is_empty() && message.len() <= 200 && !message.contains('<') =>
            {
                format!("{} (HTTP {})", message, status)
            }
            SearchError::Status { status, .. } => format!("Search failed (HTTP {})", status),
            SearchError::Network(_) => "Could not reach the icon service".to_string(),
            SearchError::Decode(_) => "The icon service sent an unreadable response".to_string(),
        }
    }
}
