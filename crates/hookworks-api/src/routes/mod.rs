//! API routes.

pub mod health;
pub mod hooks;

use crate::AppState;
use axum::Router;

/// Build the main router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(hooks::router())
        .merge(health::router())
        .with_state(state)
}
