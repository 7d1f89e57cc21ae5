//! Application state
//!
//! Holds the relay configuration and shared components

use crate::error::{Error, Result};
use crate::scan_relay::ScanRelay;
use std::sync::Arc;
use std::time::Duration;

/// Default upstream timeout (seconds)
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Record store endpoint scans are forwarded to
    pub upstream_url: String,
    /// Timeout for the upstream call
    pub upstream_timeout: Duration,
    /// Server port
    pub port: u16,
    /// Server host
    pub host: String,
}

impl AppConfig {
    /// Create config for an upstream with default host, port and timeout
    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    ///
    /// `UPSTREAM_URL` is required. It is deployment configuration and has no default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upstream_url = lookup("UPSTREAM_URL")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("UPSTREAM_URL is not set".to_string()))?;

        let mut config = Self::new(upstream_url);

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(secs) = lookup("UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::Config(format!("Invalid UPSTREAM_TIMEOUT_SECS: {}", secs)))?;
            config.upstream_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// ScanRelay (record store adapter)
    pub relay: Arc<ScanRelay>,
}

impl AppState {
    /// Build state and the upstream client from config
    pub fn new(config: AppConfig) -> Result<Self> {
        let relay = ScanRelay::new(config.upstream_url.clone(), config.upstream_timeout)?;
        Ok(Self {
            config,
            relay: Arc::new(relay),
        })
    }
}
