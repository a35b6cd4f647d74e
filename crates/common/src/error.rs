//! Service error type returned by the transaction vault.

use envelope::EnvelopeError;
use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`], [`ServiceError::Validation`],
///   [`ServiceError::IntegrityFailure`], [`ServiceError::DecryptionFailure`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Conflict`] → 409
/// - [`ServiceError::CryptoConfig`] → 500
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request itself was malformed (body shape, path parameter).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The envelope core rejected an input or a stored record.
    #[error("validation error: {0}")]
    Validation(String),

    /// No record with the requested id exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with the same id already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An authentication tag did not verify. Carries no detail on purpose:
    /// callers must not learn whether the key or the data was wrong.
    #[error("data integrity check failed")]
    IntegrityFailure,

    /// Decryption failed for a reason other than tag verification.
    #[error("decryption failure: {0}")]
    DecryptionFailure(String),

    /// The storage backend is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Key material or the random source failed.
    #[error("cryptographic configuration error: {0}")]
    CryptoConfig(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_)
            | ServiceError::Validation(_)
            | ServiceError::IntegrityFailure
            | ServiceError::DecryptionFailure(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Unavailable(_) => 503,
            ServiceError::CryptoConfig(_) => 500,
        }
    }

    /// Short label used as the `error` field of the response body.
    ///
    /// Request-level errors carry their type name, crypto errors a phrase;
    /// existing web clients match on both.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "BadRequestError",
            ServiceError::Validation(_) => "Validation Error",
            ServiceError::NotFound(_) => "NotFoundError",
            ServiceError::Conflict(_) => "ConflictError",
            ServiceError::IntegrityFailure => "Authentication Error",
            ServiceError::DecryptionFailure(_) => "Decryption Error",
            ServiceError::Unavailable(_) => "Service Unavailable",
            ServiceError::CryptoConfig(_) => "Internal Server Error",
        }
    }

    /// Message that is safe to return to the caller.
    ///
    /// Crypto failures get fixed text; their detail stays in the server logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::Validation(m)
            | ServiceError::NotFound(m)
            | ServiceError::Conflict(m) => m.clone(),
            ServiceError::IntegrityFailure => {
                "Data integrity check failed - data may have been tampered with".into()
            }
            ServiceError::DecryptionFailure(_) => "Failed to decrypt data".into(),
            ServiceError::Unavailable(_) => "Storage backend unavailable".into(),
            ServiceError::CryptoConfig(_) => "Cryptographic configuration error".into(),
        }
    }
}

impl From<EnvelopeError> for ServiceError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Validation(m) => ServiceError::Validation(m),
            EnvelopeError::Authentication => ServiceError::IntegrityFailure,
            EnvelopeError::Decryption(m) => ServiceError::DecryptionFailure(m),
            EnvelopeError::KeyManagement(m) => ServiceError::CryptoConfig(m),
        }
    }
}
