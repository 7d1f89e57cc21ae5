//! Relay client used by the controller

use crate::error::{Error, Result};
use crate::models::{RelayResponse, ScanSubmission};
use std::future::Future;
use std::time::Duration;

/// Default relay request timeout (seconds)
///
/// Outlasts the relay's own upstream timeout so a slow record store surfaces
/// as the relay's error reply rather than a client-side timeout.
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = crate::state::DEFAULT_UPSTREAM_TIMEOUT_SECS + 5;

/// Controller-side failure to reach the relay
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Submits validated ids for recording
pub trait ScanSubmitter {
    fn submit(
        &self,
        scanned_id: &str,
    ) -> impl Future<Output = std::result::Result<RelayResponse, TransportError>> + Send;
}

/// HTTP submitter posting to the relay's `/api/scan`
pub struct HttpScanSubmitter {
    client: reqwest::Client,
    url: String,
}

impl HttpScanSubmitter {
    /// Create new submitter for a relay at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/api/scan", base_url.trim_end_matches('/')),
        })
    }

    /// Get submission URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ScanSubmitter for HttpScanSubmitter {
    async fn submit(
        &self,
        scanned_id: &str,
    ) -> std::result::Result<RelayResponse, TransportError> {
        // The relay answers with a JSON outcome on 200 and 500 alike,
        // so the body is decoded regardless of status. Only a body that
        // is not JSON at all counts as a transport failure.
        let resp = self
            .client
            .post(&self.url)
            .json(&ScanSubmission::new(scanned_id))
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let body = RelayResponse::from_value(&body);

        tracing::debug!(
            scanned_id = %scanned_id,
            http_status = %status,
            relay_status = %body.status,
            "Relay responded"
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let s = HttpScanSubmitter::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(s.url(), "http://localhost:8080/api/scan");

        let s = HttpScanSubmitter::new("https://relay.example", Duration::from_secs(1)).unwrap();
        assert_eq!(s.url(), "https://relay.example/api/scan");
    }

    #[test]
    fn test_default_timeout_outlasts_upstream() {
        assert!(DEFAULT_RELAY_TIMEOUT_SECS > crate::state::DEFAULT_UPSTREAM_TIMEOUT_SECS);
    }

    #[tokio::test]
    async fn test_unreachable_relay() {
        let s = HttpScanSubmitter::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = s.submit("EVENT2025-001").await.unwrap_err();
        assert!(!err.0.is_empty());
    }
}
