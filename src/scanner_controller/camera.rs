//! Camera capability seam
//!
//! The controller drives an external QR decoding capability through this
//! trait. Decoded payloads come back through a [`DecodeSink`] handed over on
//! every `start`.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::mpsc;

/// Camera device identifier
pub type DeviceId = String;

/// Which way the preferred camera faces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera
    #[default]
    Environment,
    /// Front camera
    User,
}

/// Camera selection passed to `start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSelector {
    FacingMode(FacingMode),
    Device(DeviceId),
}

impl Default for CameraSelector {
    fn default() -> Self {
        CameraSelector::FacingMode(FacingMode::Environment)
    }
}

/// Capture settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Frames decoded per second
    pub fps: u32,
    /// Side of the square scan region (px)
    pub qrbox: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: 10, qrbox: 250 }
    }
}

/// Camera capability errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CameraError {
    #[error("No camera available")]
    Unavailable,

    #[error("Camera error: {0}")]
    Device(String),
}

/// Delivery end of the decode subscription
///
/// Never blocks the capture loop: a payload the controller is not ready for
/// is dropped.
#[derive(Debug, Clone)]
pub struct DecodeSink {
    tx: mpsc::Sender<String>,
}

impl DecodeSink {
    pub(crate) fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }

    /// Hand a decoded payload to the controller
    ///
    /// Returns false when the payload was dropped.
    pub fn deliver(&self, text: impl Into<String>) -> bool {
        match self.tx.try_send(text.into()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(text)) => {
                tracing::trace!(payload = %text, "Decode dropped (controller busy)");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Whether the controller side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// External QR decoding capability
pub trait CameraCapability {
    /// Enumerate available camera devices
    fn list_devices(&self) -> impl Future<Output = Result<Vec<DeviceId>, CameraError>> + Send;

    /// Start continuous capture, delivering decoded payloads to `sink`
    fn start(
        &self,
        selector: CameraSelector,
        frame: FrameConfig,
        sink: DecodeSink,
    ) -> impl Future<Output = Result<(), CameraError>> + Send;

    /// Stop capture and release the stream
    fn stop(&self) -> impl Future<Output = Result<(), CameraError>> + Send;

    /// Clear the preview surface
    fn clear(&self) -> impl Future<Output = Result<(), CameraError>> + Send;
}
