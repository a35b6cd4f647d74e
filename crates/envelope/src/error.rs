//! Error taxonomy for the envelope-encryption core.

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Closed set of failures returned by the core.
///
/// Transport layers should match on [`EnvelopeError::kind`] rather than on
/// the rendered message.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Malformed input, malformed record structure, or bad field encoding.
    /// Always fixable by the caller; never a security event.
    #[error("validation error: {0}")]
    Validation(String),

    /// The AEAD tag did not verify. Either the data was tampered with or the
    /// wrong key was supplied; the two cases are deliberately indistinguishable.
    #[error("authentication failure: data integrity check failed")]
    Authentication,

    /// Any other failure while recovering plaintext.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Malformed key material or an unusable random source.
    #[error("key management error: {0}")]
    KeyManagement(String),
}

/// Discriminant of an [`EnvelopeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Decryption,
    KeyManagement,
}

impl ErrorKind {
    /// Stable machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Authentication => "authentication_failure",
            ErrorKind::Decryption => "decryption_error",
            ErrorKind::KeyManagement => "key_management_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EnvelopeError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EnvelopeError::Validation(msg.into())
    }

    pub(crate) fn key_management(msg: impl Into<String>) -> Self {
        EnvelopeError::KeyManagement(msg.into())
    }

    /// Returns the discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvelopeError::Validation(_) => ErrorKind::Validation,
            EnvelopeError::Authentication => ErrorKind::Authentication,
            EnvelopeError::Decryption(_) => ErrorKind::Decryption,
            EnvelopeError::KeyManagement(_) => ErrorKind::KeyManagement,
        }
    }

    /// Returns `true` if this error should be treated as a security event
    /// (tampering or a wrong key).
    pub fn is_security_event(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
