//! Envelope encryption for JSON payloads at rest.
//!
//! Each payload is sealed with AES-256-GCM under a fresh per-record Data
//! Encryption Key (DEK). The DEK is then sealed ("wrapped") under a long-lived
//! master key, and both ciphertexts are stored together as a [`SecureRecord`].
//!
//! ```no_run
//! use envelope::{decrypt, encrypt, load_master_key, EncryptInput};
//! use serde_json::json;
//!
//! # fn main() -> envelope::Result<()> {
//! let master_key = load_master_key(&"00".repeat(32))?;
//! let input = EncryptInput::new("party_123", json!({"amount": 100}));
//! let record = encrypt(&input, master_key.as_bytes())?;
//! let result = decrypt(&record, master_key.as_bytes())?;
//! assert_eq!(result.payload, json!({"amount": 100}));
//! # Ok(())
//! # }
//! ```
//!
//! The crate is synchronous and holds no state between calls; it is safe to
//! call from any number of threads at once.

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod record;
pub mod validation;

pub use envelope::{decrypt, encrypt};
pub use error::{EnvelopeError, ErrorKind, Result};
pub use keys::{generate_master_key, load_master_key, secure_wipe, MasterKey};
pub use record::{DecryptResult, EncryptInput, SecureRecord, ALGORITHM, MASTER_KEY_VERSION};
pub use validation::{validate_encrypt_input, validate_encrypt_value, validate_secure_record};
