//! Key material: per-record DEKs, the operator-held master key, and wiping.
//!
//! # Security invariants
//!
//! - Key bytes are **never** logged; both key types print as `[REDACTED]`.
//! - [`DataKey`] and [`MasterKey`] overwrite their bytes with zeroes on drop,
//!   so every exit path of an envelope call (including `?` early returns and
//!   panics that unwind) wipes the DEK.
//! - The core never caches a master key. Callers own it and lend it per call.

use std::fmt;

use zeroize::Zeroize;

use crate::crypto::cipher::{fill_random, KEY_LEN};
use crate::error::{EnvelopeError, Result};

/// Length of a hex-encoded 32-byte key.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;

/// Overwrite `buf` with zeroes.
///
/// Uses volatile writes so the compiler cannot elide the wipe.
pub fn secure_wipe(buf: &mut [u8]) {
    buf.zeroize();
}

/// Ephemeral 32-byte Data Encryption Key, one per encrypted record.
///
/// Not `Clone`: there is exactly one copy per envelope call.
pub struct DataKey(Box<[u8; KEY_LEN]>);

impl DataKey {
    /// Copy `bytes` into a new key buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::KeyManagement`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(EnvelopeError::key_management(format!(
                "DEK must be exactly {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Drop for DataKey {
    fn drop(&mut self) {
        secure_wipe(&mut self.0[..]);
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey([REDACTED])")
    }
}

/// Long-lived 32-byte key that wraps DEKs.
pub struct MasterKey(Box<[u8; KEY_LEN]>);

impl MasterKey {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::KeyManagement`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(EnvelopeError::key_management(format!(
                "master key must be exactly {KEY_LEN} bytes (256 bits), got {} bytes",
                bytes.len()
            )));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Hex encoding of the key, for operator-side provisioning output.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }
}

impl AsRef<[u8]> for MasterKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        secure_wipe(&mut self.0[..]);
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Generate a fresh DEK from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`EnvelopeError::KeyManagement`] if the random source fails.
pub fn generate_dek() -> Result<DataKey> {
    let mut buf = Box::new([0u8; KEY_LEN]);
    fill_random(&mut buf[..])
        .map_err(|e| EnvelopeError::key_management(format!("failed to generate DEK: {e}")))?;
    Ok(DataKey(buf))
}

/// Generate a new master key for operator-side provisioning.
///
/// # Errors
///
/// Returns [`EnvelopeError::KeyManagement`] if the random source fails.
pub fn generate_master_key() -> Result<MasterKey> {
    let mut buf = Box::new([0u8; KEY_LEN]);
    fill_random(&mut buf[..]).map_err(|e| {
        EnvelopeError::key_management(format!("failed to generate master key: {e}"))
    })?;
    Ok(MasterKey(buf))
}

/// Decode a master key from its 64-character hex form (either case).
///
/// # Errors
///
/// Returns [`EnvelopeError::KeyManagement`] if the string is empty, is not
/// exactly [`KEY_HEX_LEN`] characters, or contains non-hex characters.
pub fn load_master_key(master_key_hex: &str) -> Result<MasterKey> {
    if master_key_hex.is_empty() {
        return Err(EnvelopeError::key_management("master key is required"));
    }
    if master_key_hex.len() != KEY_HEX_LEN {
        return Err(EnvelopeError::key_management(format!(
            "master key must be a {KEY_HEX_LEN}-character hexadecimal string ({KEY_LEN} bytes), \
             received {} characters",
            master_key_hex.len()
        )));
    }
    if !master_key_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EnvelopeError::key_management(
            "master key must contain only hexadecimal characters (0-9, a-f, A-F)",
        ));
    }

    let mut buf = Box::new([0u8; KEY_LEN]);
    hex::decode_to_slice(master_key_hex, &mut buf[..])
        .map_err(|e| EnvelopeError::key_management(format!("invalid master key: {e}")))?;
    let key = MasterKey(buf);

    // Re-check the decoded length independently of the string checks above.
    if key.as_bytes().len() != KEY_LEN {
        return Err(EnvelopeError::key_management(
            "invalid master key: decoded length mismatch",
        ));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const ZERO_KEY_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn generate_dek_is_random() {
        let a = generate_dek().unwrap();
        let b = generate_dek().unwrap();
        assert_eq!(a.as_bytes().len(), KEY_LEN);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn generate_master_key_round_trips_through_hex() {
        let key = generate_master_key().unwrap();
        let hex = key.to_hex();
        assert_eq!(hex.len(), KEY_HEX_LEN);
        let loaded = load_master_key(&hex).unwrap();
        assert_eq!(loaded.as_bytes(), key.as_bytes());
    }

    #[test]
    fn load_accepts_both_cases() {
        let lower = "ab".repeat(KEY_LEN);
        let upper = "AB".repeat(KEY_LEN);
        let a = load_master_key(&lower).unwrap();
        let b = load_master_key(&upper).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert!(a.as_bytes().iter().all(|&x| x == 0xAB));
    }

    #[test]
    fn load_rejects_empty() {
        let err = load_master_key("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyManagement);
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn load_rejects_wrong_lengths() {
        for len in [62, 66] {
            let err = load_master_key(&"a".repeat(len)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::KeyManagement);
            assert!(err.to_string().contains("64-character"));
        }
    }

    #[test]
    fn load_rejects_non_hex() {
        let mut s = ZERO_KEY_HEX.to_string();
        s.replace_range(10..11, "g");
        let err = load_master_key(&s).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyManagement);
        assert!(err.to_string().contains("hexadecimal characters"));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(MasterKey::from_slice(&[0u8; 31]).is_err());
        assert!(DataKey::from_slice(&[0u8; 33]).is_err());
        assert!(MasterKey::from_slice(&[0u8; KEY_LEN]).is_ok());
    }

    #[test]
    fn secure_wipe_zeroes_buffer() {
        let mut buf = [0xAAu8; KEY_LEN];
        secure_wipe(&mut buf);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn keys_redacted_in_debug() {
        let dek = DataKey::from_slice(&[0xFF; KEY_LEN]).unwrap();
        let mk = MasterKey::from_slice(&[0xFF; KEY_LEN]).unwrap();
        assert_eq!(format!("{dek:?}"), "DataKey([REDACTED])");
        assert!(!format!("{mk:?}").contains("ff"));
    }
}
