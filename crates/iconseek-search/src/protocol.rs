use serde::{Deserialize, Serialize};

use iconseek_core::IconRecord;

/// Error body returned by the proxy when the query or credential is missing.
pub const MISSING_QUERY_MESSAGE: &str = "Missing query or API key";
/// Error body returned by the proxy when the upstream call fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch icons";

/// Search response. `icons` may be absent upstream and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub icons: Vec<IconRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
