//! Shared application state injected into every Axum handler.

use crate::service::TransactionService;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the service holds its store and key behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub service: TransactionService,
}

impl AppState {
    pub fn new(service: TransactionService) -> Self {
        Self { service }
    }
}
