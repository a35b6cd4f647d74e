//! AES-256-GCM primitives.
//!
//! This module is free of record, hex and JSON concerns. It provides the
//! raw seal/open operations used twice per envelope call: once for the
//! payload under the DEK and once for the DEK under the master key.

pub mod cipher;

pub use cipher::{open, seal, CipherError, Sealed, KEY_LEN, NONCE_LEN, TAG_LEN};
