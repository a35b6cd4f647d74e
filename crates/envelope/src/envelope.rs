//! Envelope encrypt/decrypt: payload under a fresh DEK, DEK under the master key.
//!
//! Both operations are pure functions of their arguments. The DEK lives in a
//! [`DataKey`] owned by the call; it is wiped when that value drops, which
//! happens on every return path.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::{self, CipherError};
use crate::error::{EnvelopeError, Result};
use crate::keys::{generate_dek, DataKey};
use crate::record::{DecryptResult, EncryptInput, SecureRecord, ALGORITHM, MASTER_KEY_VERSION};
use crate::validation::{decode_hex, validate_encrypt_input, validate_master_key, validate_record};

/// Encrypt `input.payload` into a new [`SecureRecord`].
///
/// # Errors
///
/// Returns [`EnvelopeError::Validation`] for a bad input or master key length
/// and [`EnvelopeError::KeyManagement`] if key or nonce generation fails.
pub fn encrypt(input: &EncryptInput, master_key: &[u8]) -> Result<SecureRecord> {
    validate_encrypt_input(input)?;
    validate_master_key(master_key)?;

    let dek = generate_dek()?;

    let plaintext = zeroize::Zeroizing::new(serde_json::to_vec(&input.payload).map_err(|e| {
        EnvelopeError::validation(format!("payload must be JSON serializable: {e}"))
    })?);
    let payload = crypto::seal(&plaintext, dek.as_bytes()).map_err(seal_error)?;
    let wrapped = crypto::seal(dek.as_bytes(), master_key).map_err(seal_error)?;
    drop(dek);

    let record = SecureRecord {
        id: Uuid::new_v4().to_string(),
        party_id: input.party_id.clone(),
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        payload_nonce: hex::encode(payload.nonce),
        payload_ct: hex::encode(&payload.ciphertext),
        payload_tag: hex::encode(payload.tag),
        dek_wrap_nonce: hex::encode(wrapped.nonce),
        dek_wrapped: hex::encode(&wrapped.ciphertext),
        dek_wrap_tag: hex::encode(wrapped.tag),
        alg: ALGORITHM.to_owned(),
        mk_version: MASTER_KEY_VERSION,
    };

    debug!(record_id = %record.id, payload_len = plaintext.len(), "payload sealed");
    Ok(record)
}

/// Recover the payload of `record`.
///
/// The DEK wrap is opened first, so a wrong master key is caught before the
/// payload ciphertext is touched. A wrong key and a tampered field both
/// surface as [`EnvelopeError::Authentication`].
///
/// # Errors
///
/// Returns [`EnvelopeError::Validation`] for a malformed record or master key,
/// [`EnvelopeError::Authentication`] when a tag does not verify and
/// [`EnvelopeError::Decryption`] for any other failure.
pub fn decrypt(record: &SecureRecord, master_key: &[u8]) -> Result<DecryptResult> {
    validate_record(record)?;
    validate_master_key(master_key)?;

    let dek = unwrap_dek(record, master_key)?;

    let ciphertext = decode_hex(&record.payload_ct, "payload_ct")?;
    let nonce = decode_hex(&record.payload_nonce, "payload_nonce")?;
    let tag = decode_hex(&record.payload_tag, "payload_tag")?;

    let plaintext = crypto::open(&ciphertext, dek.as_bytes(), &nonce, &tag)
        .map_err(|e| open_error(e, &record.id, "payload"))?;
    drop(dek);

    let payload: serde_json::Value = serde_json::from_slice(&plaintext)
        .map_err(|e| EnvelopeError::Decryption(format!("recovered payload is not valid JSON: {e}")))?;
    if !payload.is_object() {
        return Err(EnvelopeError::Decryption(
            "recovered payload is not a JSON object".into(),
        ));
    }

    debug!(record_id = %record.id, "payload opened");
    Ok(DecryptResult {
        party_id: record.party_id.clone(),
        payload,
    })
}

fn unwrap_dek(record: &SecureRecord, master_key: &[u8]) -> Result<DataKey> {
    let wrapped = decode_hex(&record.dek_wrapped, "dek_wrapped")?;
    let nonce = decode_hex(&record.dek_wrap_nonce, "dek_wrap_nonce")?;
    let tag = decode_hex(&record.dek_wrap_tag, "dek_wrap_tag")?;

    let raw = crypto::open(&wrapped, master_key, &nonce, &tag)
        .map_err(|e| open_error(e, &record.id, "dek_wrap"))?;
    DataKey::from_slice(&raw)
        .map_err(|_| EnvelopeError::Decryption(format!("unwrapped DEK has invalid length {}", raw.len())))
}

fn seal_error(e: CipherError) -> EnvelopeError {
    match e {
        CipherError::RandomSource(msg) => {
            EnvelopeError::key_management(format!("nonce generation failed: {msg}"))
        }
        CipherError::SealFailure => EnvelopeError::validation("payload too large to encrypt"),
        other => EnvelopeError::key_management(other.to_string()),
    }
}

fn open_error(e: CipherError, record_id: &str, stage: &'static str) -> EnvelopeError {
    match e {
        CipherError::Authentication => {
            // Stage is for operators only; callers get the same error either way.
            warn!(record_id, stage, "authentication tag verification failed");
            EnvelopeError::Authentication
        }
        other => EnvelopeError::Decryption(other.to_string()),
    }
}
