use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::error::SearchError;
use crate::protocol::{ErrorBody, SearchResults};

/// Trait for anything that can answer a free-text icon search.
pub trait IconSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<SearchResults, SearchError>> + Send;
}

/// Client for the third-party icon search API.
///
/// Queries `GET {base_url}/icons/search?query=...` with a bearer credential.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    count: Option<u32>,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            count: None,
        }
    }

    /// Ask upstream for at most `count` results per query.
    pub fn with_count(mut self, count: Option<u32>) -> Self {
        self.count = count;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => tracing::warn!("Failed to build HTTP client with timeout: {}", e),
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a search and return the upstream JSON body untouched.
    pub async fn fetch_raw(&self, query: &str) -> Result<Value, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::MissingQuery);
        }
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        let url = format!("{}/icons/search", self.base_url.trim_end_matches('/'));
        let mut request = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .query(&[("query", query)]);
        if let Some(count) = self.count {
            request = request.query(&[("count", count)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}

impl IconSearch for UpstreamClient {
    async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        let body = self.fetch_raw(query).await?;
        serde_json::from_value(body).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

/// Client for Iconseek's own `/api/icons` proxy endpoint.
///
/// The server never uses this; it is for consumers that reach the upstream
/// only through a running Iconseek server and hold no API key themselves.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl IconSearch for ProxyClient {
    async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::MissingQuery);
        }

        let url = format!("{}/api/icons", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SearchResults>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}
