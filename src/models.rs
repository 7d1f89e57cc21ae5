//! Shared models and types
//!
//! Wire types exchanged between the scanner controller and the relay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scan submission sent by the scanner to `POST /api/scan`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSubmission {
    #[serde(rename = "scannedId")]
    pub scanned_id: String,
}

impl ScanSubmission {
    pub fn new(scanned_id: impl Into<String>) -> Self {
        Self {
            scanned_id: scanned_id.into(),
        }
    }
}

/// Outcome reported back through the relay
///
/// The relay passes the record store's body through untouched. Decode
/// arbitrary bodies with [`RelayResponse::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayResponse {
    pub const SUCCESS: &'static str = "success";

    pub fn success() -> Self {
        Self {
            status: Self::SUCCESS.to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }

    /// Read an outcome from any JSON body
    ///
    /// A non-string `status` reads as empty (not success). A non-string,
    /// non-null `message` is kept in its JSON text form.
    pub fn from_value(body: &Value) -> Self {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let message = match body.get("message") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { status, message }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_uses_camel_case_field() {
        let json = serde_json::to_value(ScanSubmission::new("EVENT2025-042")).unwrap();
        assert_eq!(json, serde_json::json!({ "scannedId": "EVENT2025-042" }));
    }

    #[test]
    fn test_relay_response_lenient_decode() {
        let resp: RelayResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.message, None);

        let resp: RelayResponse = serde_json::from_str(r#"{"message":"Already scanned"}"#).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.message.as_deref(), Some("Already scanned"));

        let resp: RelayResponse =
            serde_json::from_str(r#"{"status":"error","message":"x","row":12}"#).unwrap();
        assert_eq!(resp, RelayResponse::error("x"));
    }

    #[test]
    fn test_from_value_tolerates_odd_field_types() {
        let resp = RelayResponse::from_value(&json!({"status": null, "message": "x"}));
        assert!(!resp.is_success());
        assert_eq!(resp.message.as_deref(), Some("x"));

        let resp = RelayResponse::from_value(&json!({"status": "error", "message": 42}));
        assert_eq!(resp, RelayResponse::error("42"));

        let resp = RelayResponse::from_value(&json!({"status": true, "message": null}));
        assert_eq!(resp.status, "");
        assert_eq!(resp.message, None);

        let resp = RelayResponse::from_value(&json!(["not", "an", "object"]));
        assert!(!resp.is_success());
        assert_eq!(resp.message, None);

        let resp = RelayResponse::from_value(&json!({"status": "success", "row": 3}));
        assert_eq!(resp, RelayResponse::success());
    }
}
