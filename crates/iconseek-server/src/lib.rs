//! Iconseek Server - icon search pages, favorites, and the upstream search proxy.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
