//! AES-256-GCM sealing and opening with a detached authentication tag.
//!
//! Every [`seal`] call draws a fresh 96-bit nonce from the OS CSPRNG. GCM
//! nonce reuse under one key breaks both confidentiality and authentication,
//! so keys must not be used for anywhere near 2^32 seals. Per-record DEKs are
//! used exactly once; the master key wraps one DEK per record.

use aes_gcm::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, Nonce, OsRng, Tag},
    Aes256Gcm,
};
use thiserror::Error;
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of a GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of a GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Output of a single [`seal`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Random nonce used for this call.
    pub nonce: [u8; NONCE_LEN],
    /// Authentication tag over the ciphertext.
    pub tag: [u8; TAG_LEN],
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The nonce is the wrong length (must be [`NONCE_LEN`] bytes).
    #[error("invalid nonce length: expected {NONCE_LEN} bytes, got {0}")]
    InvalidNonceLength(usize),

    /// The tag is the wrong length (must be [`TAG_LEN`] bytes).
    #[error("invalid tag length: expected {TAG_LEN} bytes, got {0}")]
    InvalidTagLength(usize),

    /// The AEAD primitive rejected the tag.
    #[error("authentication tag verification failed")]
    Authentication,

    /// The AEAD primitive refused to encrypt (plaintext too long).
    #[error("aead encryption failed")]
    SealFailure,

    /// The OS random source could not produce bytes.
    #[error("random source unavailable: {0}")]
    RandomSource(String),
}

/// Encrypt `plaintext` under `key`, returning ciphertext, nonce and tag.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes,
/// [`CipherError::RandomSource`] if no nonce could be drawn, and
/// [`CipherError::SealFailure`] if the primitive rejects the input.
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<Sealed, CipherError> {
    let cipher = build_cipher(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    // Wiped on drop if the primitive bails out while it still holds plaintext.
    let mut buffer = Zeroizing::new(plaintext.to_vec());
    let tag = cipher
        .encrypt_in_place_detached(
            Nonce::<Aes256Gcm>::from_slice(&nonce),
            b"",
            buffer.as_mut_slice(),
        )
        .map_err(|_| CipherError::SealFailure)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(Sealed {
        ciphertext: std::mem::take(&mut *buffer),
        nonce,
        tag: tag_bytes,
    })
}

/// Verify and decrypt `ciphertext` under `key`.
///
/// The tag is checked before any plaintext is released. On failure the
/// working buffer is wiped and dropped; no partial plaintext escapes.
///
/// # Errors
///
/// Returns [`CipherError::Authentication`] when the primitive rejects the tag
/// (tampered data, wrong key or wrong nonce) and a length variant when an
/// argument has the wrong size.
pub fn open(
    ciphertext: &[u8],
    key: &[u8],
    nonce: &[u8],
    tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    let cipher = build_cipher(key)?;
    if nonce.len() != NONCE_LEN {
        return Err(CipherError::InvalidNonceLength(nonce.len()));
    }
    if tag.len() != TAG_LEN {
        return Err(CipherError::InvalidTagLength(tag.len()));
    }

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::<Aes256Gcm>::from_slice(nonce),
            b"",
            buffer.as_mut_slice(),
            Tag::<Aes256Gcm>::from_slice(tag),
        )
        .map_err(|_| CipherError::Authentication)?;

    Ok(buffer)
}

/// Fill `buf` from the OS CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CipherError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CipherError::RandomSource(e.to_string()))
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}
