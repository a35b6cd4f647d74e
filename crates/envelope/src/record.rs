//! The persisted record and the encrypt/decrypt value types.
//!
//! The serialised field names of [`SecureRecord`] are a storage format shared
//! with existing data and must not change.

use serde::{Deserialize, Serialize};

/// Cipher suite identifier carried by every record.
pub const ALGORITHM: &str = "AES-256-GCM";

/// Master key version stamped on new records.
pub const MASTER_KEY_VERSION: u32 = 1;

/// An encrypted payload together with its wrapped DEK.
///
/// Created once by [`crate::encrypt`] and read-only thereafter. All
/// cryptographic fields are hex text; the validator accepts either case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureRecord {
    /// UUID v4 assigned at encryption time.
    pub id: String,
    /// Caller-supplied label, stored in the clear.
    #[serde(rename = "partyId")]
    pub party_id: String,
    /// RFC 3339 creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: String,

    /// 12-byte nonce for the payload ciphertext.
    pub payload_nonce: String,
    /// Payload ciphertext.
    pub payload_ct: String,
    /// 16-byte payload tag.
    pub payload_tag: String,

    /// 12-byte nonce for the DEK wrap.
    pub dek_wrap_nonce: String,
    /// DEK ciphertext under the master key.
    pub dek_wrapped: String,
    /// 16-byte DEK wrap tag.
    pub dek_wrap_tag: String,

    /// Always [`ALGORITHM`].
    pub alg: String,
    /// Version of the master key that produced the wrap (>= 1).
    pub mk_version: u32,
}

/// Input to [`crate::encrypt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptInput {
    #[serde(rename = "partyId")]
    pub party_id: String,
    /// Must be a JSON object.
    pub payload: serde_json::Value,
}

impl EncryptInput {
    pub fn new(party_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            party_id: party_id.into(),
            payload,
        }
    }
}

/// Output of [`crate::decrypt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptResult {
    #[serde(rename = "partyId")]
    pub party_id: String,
    pub payload: serde_json::Value,
}
