//! Persistence for [`SecureRecord`]s.
//!
//! The envelope core only produces and consumes records; where they live is
//! decided here. Backends implement [`RecordStore`]; the service holds one as
//! `Arc<dyn RecordStore>`.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use common::protocol::RecordSummary;
use common::ServiceError;
use envelope::SecureRecord;
use thiserror::Error;

/// Errors produced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A record with this id is already stored.
    #[error("record with id '{0}' already exists")]
    Conflict(String),

    /// The backend failed to complete the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Conflict(_) => ServiceError::Conflict(e.to_string()),
            StorageError::Backend(msg) => ServiceError::Unavailable(msg),
        }
    }
}

/// Storage abstraction over encrypted transaction records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if a record with the same id exists.
    async fn save(&self, record: &SecureRecord) -> Result<(), StorageError>;

    /// Fetch a record by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<SecureRecord>, StorageError>;

    /// Whether a record with `id` is stored.
    async fn exists(&self, id: &str) -> Result<bool, StorageError>;

    /// Public metadata of every stored record, newest first.
    async fn find_all(&self) -> Result<Vec<RecordSummary>, StorageError>;

    /// `true` if the backend can serve requests.
    async fn health_check(&self) -> bool;

    /// Short backend name reported by `GET /health`.
    fn backend_name(&self) -> &'static str;
}
