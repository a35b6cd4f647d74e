//! [`MemoryStore`]: process-local record storage. Contents are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::protocol::RecordSummary;
use envelope::SecureRecord;
use tokio::sync::RwLock;

use super::{RecordStore, StorageError};

/// In-memory [`RecordStore`] backed by a `HashMap` keyed on record id.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, SecureRecord>>>,
}

impl MemoryStore {
    /// Create a new, empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Remove every record.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, record: &SecureRecord) -> Result<(), StorageError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&record.id) {
            return Err(StorageError::Conflict(record.id.clone()));
        }
        map.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SecureRecord>, StorageError> {
        Ok(self.inner.read().await.get(id).cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.inner.read().await.contains_key(id))
    }

    async fn find_all(&self) -> Result<Vec<RecordSummary>, StorageError> {
        let map = self.inner.read().await;
        let mut summaries: Vec<RecordSummary> = map.values().map(RecordSummary::from).collect();
        // RFC 3339 UTC timestamps of equal precision sort lexicographically.
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(summaries)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
