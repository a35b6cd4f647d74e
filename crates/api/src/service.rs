//! [`TransactionService`]: envelope encryption plus storage, behind one API.

use std::sync::Arc;

use common::protocol::{DecryptResponse, RecordSummary};
use common::ServiceError;
use envelope::{EncryptInput, EnvelopeError, MasterKey, SecureRecord};
use tracing::{error, info, warn};

use crate::storage::RecordStore;

/// Encrypts, stores, loads and decrypts transaction records.
///
/// The master key is loaded once at startup and lent to the envelope core on
/// every call; the core itself never retains it.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn RecordStore>,
    master_key: Arc<MasterKey>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn RecordStore>, master_key: MasterKey) -> Self {
        Self {
            store,
            master_key: Arc::new(master_key),
        }
    }

    /// Encrypt `input` and store the resulting record.
    pub async fn encrypt(&self, input: EncryptInput) -> Result<SecureRecord, ServiceError> {
        let record = envelope::encrypt(&input, self.master_key.as_bytes())
            .map_err(|e| crypto_failure(e, None))?;
        self.store.save(&record).await?;
        info!(record_id = %record.id, party_id = %record.party_id, "record stored");
        Ok(record)
    }

    /// Fetch a stored record without decrypting it.
    pub async fn get(&self, id: &str) -> Result<SecureRecord, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaction with id '{id}' not found")))
    }

    /// Load and decrypt a stored record.
    pub async fn decrypt(&self, id: &str) -> Result<DecryptResponse, ServiceError> {
        let record = self.get(id).await?;
        let result = envelope::decrypt(&record, self.master_key.as_bytes())
            .map_err(|e| crypto_failure(e, Some(id)))?;
        Ok(DecryptResponse {
            id: record.id,
            party_id: result.party_id,
            payload: result.payload,
        })
    }

    /// Public metadata of every stored record.
    pub async fn list(&self) -> Result<Vec<RecordSummary>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn storage_name(&self) -> &'static str {
        self.store.backend_name()
    }
}

/// Log crypto failures that operators must see, then convert.
fn crypto_failure(e: EnvelopeError, record_id: Option<&str>) -> ServiceError {
    if e.is_security_event() {
        warn!(
            record_id = record_id.unwrap_or("-"),
            kind = %e.kind(),
            "security event: integrity check failed"
        );
    } else if matches!(e, EnvelopeError::KeyManagement(_)) {
        error!(error = %e, "key management failure");
    }
    ServiceError::from(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, MockRecordStore, StorageError};
    use envelope::generate_master_key;
    use serde_json::json;

    fn service_with(store: impl RecordStore + 'static) -> TransactionService {
        TransactionService::new(Arc::new(store), generate_master_key().unwrap())
    }

    #[tokio::test]
    async fn encrypt_get_decrypt_round_trip() {
        let svc = service_with(MemoryStore::new());
        let record = svc
            .encrypt(EncryptInput::new("party_123", json!({"amount": 100, "currency": "AED"})))
            .await
            .unwrap();

        assert_eq!(svc.get(&record.id).await.unwrap(), record);

        let decrypted = svc.decrypt(&record.id).await.unwrap();
        assert_eq!(decrypted.id, record.id);
        assert_eq!(decrypted.party_id, "party_123");
        assert_eq!(decrypted.payload, json!({"amount": 100, "currency": "AED"}));

        let list = svc.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, record.id);
    }

    #[tokio::test]
    async fn invalid_input_is_validation_error_and_not_stored() {
        let store = MemoryStore::new();
        let svc = service_with(store.clone());
        let err = svc.encrypt(EncryptInput::new("p", json!(null))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let svc = service_with(MemoryStore::new());
        let err = svc.decrypt("6a2f41a3-c54c-4b6e-9c4f-1e0e3b0b8d11").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn tampered_record_is_integrity_failure() {
        let store = MemoryStore::new();
        let svc = service_with(store.clone());
        let record = svc.encrypt(EncryptInput::new("p", json!({"a": 1}))).await.unwrap();

        let mut tampered = record.clone();
        let last = tampered.payload_tag.pop().unwrap();
        tampered.payload_tag.push(if last == '0' { '1' } else { '0' });
        store.clear().await;
        store.save(&tampered).await.unwrap();

        let err = svc.decrypt(&record.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::IntegrityFailure));
    }

    #[tokio::test]
    async fn record_from_other_master_key_is_integrity_failure() {
        let store = MemoryStore::new();
        let writer = service_with(store.clone());
        let reader = TransactionService::new(Arc::new(store), generate_master_key().unwrap());
        let record = writer.encrypt(EncryptInput::new("p", json!({"a": 1}))).await.unwrap();
        let err = reader.decrypt(&record.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::IntegrityFailure));
    }

    #[tokio::test]
    async fn storage_conflict_maps_to_conflict() {
        let mut mock = MockRecordStore::new();
        mock.expect_save()
            .times(1)
            .returning(|r| Err(StorageError::Conflict(r.id.clone())));
        let svc = service_with(mock);
        let err = svc.encrypt(EncryptInput::new("p", json!({"a": 1}))).await.unwrap_err();
        assert_eq!(err.http_status(), 409);
    }

    #[tokio::test]
    async fn storage_backend_failure_maps_to_unavailable() {
        let mut mock = MockRecordStore::new();
        mock.expect_find_all()
            .returning(|| Err(StorageError::Backend("connection refused".into())));
        let svc = service_with(mock);
        let err = svc.list().await.unwrap_err();
        assert_eq!(err.http_status(), 503);
    }

    #[tokio::test]
    async fn health_reflects_store() {
        let mut mock = MockRecordStore::new();
        mock.expect_health_check().returning(|| false);
        mock.expect_backend_name().return_const("mock");
        let svc = service_with(mock);
        assert!(!svc.health_check().await);
        assert_eq!(svc.storage_name(), "mock");
    }
}
