//! Request and response bodies of the transaction-vault HTTP API.
//!
//! `POST /tx/encrypt` and `GET /tx/:id` return a bare
//! [`envelope::SecureRecord`]; the remaining bodies are defined here.

use serde::{Deserialize, Serialize};

/// Response body for `POST /tx/:id/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub id: String,
    #[serde(rename = "partyId")]
    pub party_id: String,
    /// The original JSON object passed to `POST /tx/encrypt`.
    pub payload: serde_json::Value,
}

/// One entry of `GET /tx`. Carries only public metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    #[serde(rename = "partyId")]
    pub party_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&envelope::SecureRecord> for RecordSummary {
    fn from(r: &envelope::SecureRecord) -> Self {
        Self {
            id: r.id.clone(),
            party_id: r.party_id.clone(),
            created_at: r.created_at.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error label (e.g. `"Validation Error"`).
    pub error: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a label, message and status.
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(e: &crate::ServiceError) -> Self {
        Self::new(e.label(), e.public_message(), e.http_status())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"unhealthy"`.
    pub status: String,
    /// Name of the storage backend in use.
    pub storage: String,
    /// RFC 3339 time the check ran.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use serde_json::json;

    #[test]
    fn decrypt_response_uses_camel_case() {
        let resp = DecryptResponse {
            id: "id-1".into(),
            party_id: "party_123".into(),
            payload: json!({"amount": 100}),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["partyId"], "party_123");
        assert_eq!(value["payload"]["amount"], 100);
    }

    #[test]
    fn error_response_from_service_error() {
        let e = ErrorResponse::from(&ServiceError::IntegrityFailure);
        assert_eq!(e.status_code, 400);
        assert_eq!(e.error, "Authentication Error");
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["statusCode"], 400);
    }

    #[test]
    fn summary_serde() {
        let s = RecordSummary {
            id: "a".into(),
            party_id: "p".into(),
            created_at: "2024-05-01T12:00:00.000Z".into(),
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"createdAt\""));
        let decoded: RecordSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, s);
    }
}
