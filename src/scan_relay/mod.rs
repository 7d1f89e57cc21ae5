//! ScanRelay - Record Store Adapter
//!
//! ## Responsibilities
//!
//! - Forward scan submissions to the configured record store
//! - Normalize the store's response body into JSON
//!
//! The record store is a spreadsheet script endpoint. It frequently answers
//! with a `text/plain` content type, and sometimes prefixes the body with a
//! byte order mark, so the body is read once and decoded in two passes.

use crate::error::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// UTF-8 byte order mark
const BOM: char = '\u{feff}';

/// ScanRelay instance
pub struct ScanRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl ScanRelay {
    /// Create new ScanRelay for `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Forward `payload` to the record store and return its parsed body
    ///
    /// Exactly one outbound POST per call. The upstream status code is not
    /// inspected: whatever JSON the store answers with is handed back as is.
    pub async fn relay(&self, payload: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::RelayFailure(e.to_string()))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::RelayFailure(e.to_string()))?;

        tracing::debug!(
            status = %status,
            content_type = %content_type,
            bytes = body.len(),
            "Record store responded"
        );

        parse_upstream_body(&body)
    }

    /// Get endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode a record store body
///
/// Strict JSON decoding of the raw bytes first; on failure the body is
/// treated as text (lossy UTF-8, BOM and surrounding whitespace removed)
/// and parsed again.
pub fn parse_upstream_body(body: &[u8]) -> Result<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Ok(value),
        Err(strict_err) => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim_start_matches(BOM).trim();

            serde_json::from_str::<Value>(text).map_err(|text_err| {
                tracing::warn!(
                    strict_error = %strict_err,
                    text_error = %text_err,
                    "Record store body is not JSON"
                );
                Error::RelayFailure(format!("Invalid JSON from record store: {}", text_err))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json() {
        let value = parse_upstream_body(br#"{"status":"success","message":"ok"}"#).unwrap();
        assert_eq!(value, json!({"status": "success", "message": "ok"}));
    }

    #[test]
    fn test_text_fallback_strips_bom() {
        let body = "\u{feff}{\"status\":\"error\",\"message\":\"Already scanned\"}\n";
        assert!(serde_json::from_slice::<Value>(body.as_bytes()).is_err());

        let value = parse_upstream_body(body.as_bytes()).unwrap();
        assert_eq!(value["message"], "Already scanned");
    }

    #[test]
    fn test_non_object_json_passes_through() {
        assert_eq!(parse_upstream_body(b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(parse_upstream_body(b"\"done\"").unwrap(), json!("done"));
    }

    #[test]
    fn test_unparseable_body() {
        let err = parse_upstream_body(b"<html>Script error</html>").unwrap_err();
        assert!(matches!(err, Error::RelayFailure(_)));

        let err = parse_upstream_body(b"").unwrap_err();
        assert!(matches!(err, Error::RelayFailure(_)));
    }

    #[tokio::test]
    async fn test_network_error_is_relay_failure() {
        // Port 1 on loopback has no listener
        let relay = ScanRelay::new("http://127.0.0.1:1/exec", Duration::from_secs(2)).unwrap();
        assert_eq!(relay.endpoint(), "http://127.0.0.1:1/exec");
        let err = relay.relay(&json!({"scannedId": "EVENT2025-001"})).await.unwrap_err();
        match err {
            Error::RelayFailure(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
