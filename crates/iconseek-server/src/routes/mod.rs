pub mod api;
pub mod favorites;
pub mod health;
pub mod pages;
pub mod proxy;

use axum::Router;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(pages::routes())
        .merge(favorites::routes())
        .merge(proxy::routes())
        .merge(api::routes())
        .merge(health::routes())
        .with_state(state)
}
