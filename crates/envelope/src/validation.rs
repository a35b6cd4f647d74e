//! Structural and encoding checks run before any key material is touched.
//!
//! Hex checks are split into a character-class check and a length check so
//! that "not hex" and "wrong size" produce different messages.

use serde_json::{Map, Value};

use crate::crypto::{KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::error::{EnvelopeError, Result};
use crate::record::{EncryptInput, SecureRecord, ALGORITHM};

/// Longest prefix of an offending value echoed back in an error message.
const PREVIEW_CHARS: usize = 20;

/// Reject `value` unless every character is in `[0-9a-fA-F]`.
pub fn validate_hex(value: &str, field: &str) -> Result<()> {
    if value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(());
    }
    let preview: String = value.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if value.chars().count() > PREVIEW_CHARS { "..." } else { "" };
    Err(EnvelopeError::validation(format!(
        "{field} must contain only hexadecimal characters (0-9, a-f, A-F), received: {preview}{ellipsis}"
    )))
}

/// Reject `value` unless it is exactly `expected_bytes * 2` characters long.
pub fn validate_hex_length(value: &str, expected_bytes: usize, field: &str) -> Result<()> {
    let expected_chars = expected_bytes * 2;
    if value.len() != expected_chars {
        return Err(EnvelopeError::validation(format!(
            "{field} must be exactly {expected_bytes} bytes ({expected_chars} hex characters), \
             received {} characters",
            value.len()
        )));
    }
    Ok(())
}

/// A nonce is [`NONCE_LEN`] bytes of hex.
pub fn validate_nonce(value: &str, field: &str) -> Result<()> {
    validate_hex(value, field)?;
    validate_hex_length(value, NONCE_LEN, field)
}

/// A tag is [`TAG_LEN`] bytes of hex.
pub fn validate_auth_tag(value: &str, field: &str) -> Result<()> {
    validate_hex(value, field)?;
    validate_hex_length(value, TAG_LEN, field)
}

/// A ciphertext is non-empty, even-length hex.
pub fn validate_ciphertext(value: &str, field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(EnvelopeError::validation(format!("{field} cannot be empty")));
    }
    validate_hex(value, field)?;
    if value.len() % 2 != 0 {
        return Err(EnvelopeError::validation(format!(
            "{field} must have an even number of hex characters ({} is odd)",
            value.len()
        )));
    }
    Ok(())
}

/// Decode a hex field after checking its character class.
pub fn decode_hex(value: &str, field: &str) -> Result<Vec<u8>> {
    validate_hex(value, field)?;
    hex::decode(value).map_err(|e| EnvelopeError::validation(format!("{field}: {e}")))
}

/// A master key handed to encrypt/decrypt must be [`KEY_LEN`] bytes.
pub fn validate_master_key(key: &[u8]) -> Result<()> {
    if key.len() != KEY_LEN {
        return Err(EnvelopeError::validation(format!(
            "master key must be exactly {KEY_LEN} bytes (256 bits), received {} bytes",
            key.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Encrypt input
// ---------------------------------------------------------------------------

/// Check a typed [`EncryptInput`].
pub fn validate_encrypt_input(input: &EncryptInput) -> Result<()> {
    if input.party_id.trim().is_empty() {
        return Err(EnvelopeError::validation("partyId must be a non-empty string"));
    }
    if !input.payload.is_object() {
        return Err(EnvelopeError::validation(
            "payload must be a non-null object (not an array)",
        ));
    }
    // Ownership rules out cyclic values; this still catches anything the
    // serializer refuses.
    serde_json::to_vec(&input.payload).map_err(|e| {
        EnvelopeError::validation(format!("payload must be JSON serializable: {e}"))
    })?;
    Ok(())
}

/// Check an untyped request body and convert it into an [`EncryptInput`].
pub fn validate_encrypt_value(value: &Value) -> Result<EncryptInput> {
    let obj = value
        .as_object()
        .ok_or_else(|| EnvelopeError::validation("input must be an object"))?;

    let party_id = match obj.get("partyId") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(EnvelopeError::validation("partyId must be a non-empty string")),
    };
    let payload = obj.get("payload").cloned().unwrap_or(Value::Null);

    let input = EncryptInput { party_id, payload };
    validate_encrypt_input(&input)?;
    Ok(input)
}

// ---------------------------------------------------------------------------
// Secure record
// ---------------------------------------------------------------------------

/// Check every field of a typed [`SecureRecord`].
pub fn validate_record(record: &SecureRecord) -> Result<()> {
    if record.id.is_empty() {
        return Err(EnvelopeError::validation("id must be a non-empty string"));
    }
    if record.party_id.is_empty() {
        return Err(EnvelopeError::validation("partyId must be a non-empty string"));
    }
    if record.created_at.is_empty() {
        return Err(EnvelopeError::validation("createdAt must be a non-empty string"));
    }
    if record.alg != ALGORITHM {
        return Err(EnvelopeError::validation(format!(
            "alg must be '{ALGORITHM}', received: {}",
            record.alg
        )));
    }
    if record.mk_version < 1 {
        return Err(EnvelopeError::validation("mk_version must be a positive number"));
    }

    validate_nonce(&record.payload_nonce, "payload_nonce")?;
    validate_ciphertext(&record.payload_ct, "payload_ct")?;
    validate_auth_tag(&record.payload_tag, "payload_tag")?;

    validate_nonce(&record.dek_wrap_nonce, "dek_wrap_nonce")?;
    validate_ciphertext(&record.dek_wrapped, "dek_wrapped")?;
    validate_auth_tag(&record.dek_wrap_tag, "dek_wrap_tag")?;
    Ok(())
}

impl SecureRecord {
    /// Run [`validate_record`] on `self`.
    pub fn validate(&self) -> Result<()> {
        validate_record(self)
    }
}

/// Check an arbitrary value claimed to be a [`SecureRecord`] and convert it.
///
/// Fields are checked in a fixed order (metadata, `alg`, `mk_version`, then
/// the six crypto fields) and the first failure is reported.
pub fn validate_secure_record(value: &Value) -> Result<SecureRecord> {
    let obj = value
        .as_object()
        .ok_or_else(|| EnvelopeError::validation("record must be an object"))?;

    let id = non_empty_string_field(obj, "id")?;
    let party_id = non_empty_string_field(obj, "partyId")?;
    let created_at = non_empty_string_field(obj, "createdAt")?;

    let alg = string_field(obj, "alg")?;
    if alg != ALGORITHM {
        return Err(EnvelopeError::validation(format!(
            "alg must be '{ALGORITHM}', received: {alg}"
        )));
    }

    let mk_version = obj
        .get("mk_version")
        .and_then(Value::as_u64)
        .filter(|&n| n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| EnvelopeError::validation("mk_version must be a positive number"))?;

    let payload_nonce = string_field(obj, "payload_nonce")?;
    validate_nonce(&payload_nonce, "payload_nonce")?;
    let payload_ct = string_field(obj, "payload_ct")?;
    validate_ciphertext(&payload_ct, "payload_ct")?;
    let payload_tag = string_field(obj, "payload_tag")?;
    validate_auth_tag(&payload_tag, "payload_tag")?;

    let dek_wrap_nonce = string_field(obj, "dek_wrap_nonce")?;
    validate_nonce(&dek_wrap_nonce, "dek_wrap_nonce")?;
    let dek_wrapped = string_field(obj, "dek_wrapped")?;
    validate_ciphertext(&dek_wrapped, "dek_wrapped")?;
    let dek_wrap_tag = string_field(obj, "dek_wrap_tag")?;
    validate_auth_tag(&dek_wrap_tag, "dek_wrap_tag")?;

    Ok(SecureRecord {
        id,
        party_id,
        created_at,
        payload_nonce,
        payload_ct,
        payload_tag,
        dek_wrap_nonce,
        dek_wrapped,
        dek_wrap_tag,
        alg,
        mk_version,
    })
}

fn string_field(obj: &Map<String, Value>, field: &str) -> Result<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(EnvelopeError::validation(format!("{field} must be a string"))),
    }
}

fn non_empty_string_field(obj: &Map<String, Value>, field: &str) -> Result<String> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(EnvelopeError::validation(format!(
            "{field} must be a non-empty string"
        ))),
    }
}
