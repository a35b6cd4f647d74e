//! Axum middleware layers applied to the router.
//!
//! Includes request tracing and timeout enforcement.

use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Wrap every route of `router` in request tracing and a `timeout` deadline.
pub fn apply<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
}
