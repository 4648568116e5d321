use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iconseek_db::{init_database, RedbStore};
use iconseek_search::UpstreamClient;
use iconseek_server::{create_router, AppState, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!(
                "Optional: ICONSEEK_LISTEN_ADDR, ICONSEEK_DB_PATH, ICONSEEK_UPSTREAM_URL, \
                 ICONSEEK_API_KEY, ICONSEEK_SEARCH_COUNT, ICONSEEK_UPSTREAM_TIMEOUT_SECS"
            );
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Iconseek server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database path: {}", config.db_path.display());
    tracing::info!("Upstream: {}", config.upstream_url);

    // Initialize database
    let db = match init_database(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Database error: {}", e);
            std::process::exit(1);
        }
    };
    let storage = Arc::new(RedbStore::new(db));

    let upstream = UpstreamClient::new(config.upstream_url.clone(), config.api_key.clone())
        .with_count(config.search_count)
        .with_timeout(config.upstream_timeout);
    if !upstream.has_api_key() {
        tracing::warn!("ICONSEEK_API_KEY is not set; every icon search will be rejected");
    }

    let state = AppState::new(storage, upstream);
    tracing::info!(
        "Loaded {} favorites",
        state.favorites.lock().await.count()
    );

    // Forget idle rate limit windows
    let limiters = [state.search_limiter.clone(), state.write_limiter.clone()];
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed: usize = limiters.iter().map(|l| l.cleanup()).sum();
            if removed > 0 {
                tracing::debug!("Dropped {} idle rate limit windows", removed);
            }
        }
    });

    // Build router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);
    let app = create_router(state)
        .layer(ServiceBuilder::new().layer(cors))
        .into_make_service_with_connect_info::<std::net::SocketAddr>();

    // Start server
    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
