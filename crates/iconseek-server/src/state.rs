use std::sync::Arc;

use tokio::sync::Mutex;

use iconseek_core::{FavoritesStore, KeyValueStore};
use iconseek_search::UpstreamClient;

use crate::middleware::{search_limiter, write_limiter, RateLimiter};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub favorites: Arc<Mutex<FavoritesStore>>,
    pub upstream: Arc<UpstreamClient>,
    pub search_limiter: Arc<RateLimiter>,
    pub write_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(storage: Arc<dyn KeyValueStore>, upstream: UpstreamClient) -> Self {
        Self {
            favorites: Arc::new(Mutex::new(FavoritesStore::new(storage))),
            upstream: Arc::new(upstream),
            search_limiter: Arc::new(search_limiter()),
            write_limiter: Arc::new(write_limiter()),
        }
    }
}
