//! Scanner controller types

use super::camera::{CameraSelector, FrameConfig};
use crate::models::RelayResponse;
use crate::qr_format::QrFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status shown for a payload that fails format validation
pub const STATUS_INVALID_FORMAT: &str = "Invalid QR Code";
/// Status shown for an id already in the session log
pub const STATUS_SESSION_DUPLICATE: &str = "Already Scanned (Session)";
/// Status shown when the record store accepted the scan
pub const STATUS_SUBMITTED: &str = "Submitted";
/// Status shown when the record store already holds the id
pub const STATUS_ALREADY_SCANNED: &str = "Already Scanned";
/// Status shown when the relay could not be reached
pub const STATUS_TRANSPORT_ERROR: &str = "Error";
/// Fallback for a rejection without a message
pub const STATUS_REJECTED_FALLBACK: &str = "Invalid QR";

/// Upstream message that marks a store-side duplicate
const UPSTREAM_DUPLICATE_MESSAGE: &str = "Already scanned";

/// Feedback icon shown after a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackIcon {
    #[default]
    None,
    Success,
    Warning,
    Error,
}

impl FeedbackIcon {
    /// Glyph rendered for the icon
    pub fn glyph(&self) -> &'static str {
        match self {
            FeedbackIcon::None => "",
            FeedbackIcon::Success => "✅",
            FeedbackIcon::Warning => "⚠️",
            FeedbackIcon::Error => "❌",
        }
    }
}

/// Controller lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    /// Not capturing (never mounted, or no camera available)
    #[default]
    Idle,
    /// Camera capturing, waiting for a decode
    Scanning,
    /// A decoded payload is being handled
    Processing,
    /// Camera paused while feedback is displayed
    Feedback,
    /// Torn down
    Stopped,
}

/// Transient UI state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanState {
    pub status: String,
    pub feedback_icon: FeedbackIcon,
    pub processing: bool,
    pub phase: ControllerPhase,
    /// Decodes handled so far (ignored decodes excluded)
    pub attempts: u64,
}

/// One completed submission attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// QR payload
    pub id: String,
    /// Outcome label
    pub result: String,
    /// Local wall-clock time of the outcome
    pub time: String,
}

impl ScanRecord {
    /// Create a record stamped with the current local time
    pub fn now(id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: result.into(),
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.time, self.id, self.result)
    }
}

/// Icon and status line for an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub icon: FeedbackIcon,
    pub message: String,
}

impl Feedback {
    pub fn new(icon: FeedbackIcon, message: impl Into<String>) -> Self {
        Self {
            icon,
            message: message.into(),
        }
    }

    /// Map a relay response to feedback
    pub fn from_response(resp: &RelayResponse) -> Self {
        if resp.is_success() {
            return Self::new(FeedbackIcon::Success, STATUS_SUBMITTED);
        }
        match resp.message.as_deref() {
            Some(UPSTREAM_DUPLICATE_MESSAGE) => {
                Self::new(FeedbackIcon::Warning, STATUS_ALREADY_SCANNED)
            }
            Some(msg) if !msg.is_empty() => Self::new(FeedbackIcon::Error, msg),
            _ => Self::new(FeedbackIcon::Error, STATUS_REJECTED_FALLBACK),
        }
    }
}

/// Result of handling one decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Another scan was in flight; the decode was dropped
    Ignored,
    /// Payload does not match the ticket format
    InvalidFormat,
    /// Id already recorded in this session
    SessionDuplicate,
    /// Record store accepted the scan
    Submitted(ScanRecord),
    /// Record store answered with a non-success outcome
    UpstreamRejected(ScanRecord),
    /// The relay could not be reached or answered garbage
    TransportError(String),
}

impl ScanOutcome {
    /// Record appended to the session log, if any
    pub fn record(&self) -> Option<&ScanRecord> {
        match self {
            ScanOutcome::Submitted(r) | ScanOutcome::UpstreamRejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Controller settings
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Ticket format rule
    pub format: QrFormat,
    /// Camera preference
    pub selector: CameraSelector,
    /// Capture settings
    pub frame: FrameConfig,
    /// Feedback window with the camera paused
    pub cooldown: Duration,
    /// Pause the camera and run the cooldown after a transport error too
    pub pause_on_transport_error: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            format: QrFormat::default(),
            selector: CameraSelector::default(),
            frame: FrameConfig::default(),
            cooldown: Duration::from_secs(3),
            pause_on_transport_error: true,
        }
    }
}
