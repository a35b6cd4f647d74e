//! Axum router construction.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState, request_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/tx", get(handlers::list))
        .route("/tx/encrypt", post(handlers::encrypt))
        .route("/tx/:id", get(handlers::get))
        .route("/tx/:id/decrypt", post(handlers::decrypt))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found);

    middleware::apply(routes, request_timeout).with_state(state)
}
