//! Route modules.

pub mod effects;
pub mod health;
pub mod rolls;

use axum::Router;

use crate::state::AppState;

/// The full application router, without middleware layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/rolls", rolls::router())
        .nest("/api/v1/effects", effects::router())
        .with_state(state)
}
