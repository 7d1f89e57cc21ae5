//! ScannerController - Check-in Scan Flow
//!
//! ## Responsibilities
//!
//! - Own the camera capture stream (start, pause, resume, teardown)
//! - Validate and deduplicate decoded payloads
//! - Submit new ids through the relay
//! - Drive feedback state and the cooldown window
//!
//! ## Lifecycle
//!
//! ```text
//! Idle -> Scanning -> Processing -> Feedback (cooldown) -> Scanning
//!                          \-> Scanning (local rejection)
//! any -> Stopped (teardown)
//! ```
//!
//! One decode is handled at a time. Payloads decoded while a scan is in
//! flight are dropped, never queued.

mod camera;
mod line_camera;
mod session_log;
mod submitter;
mod types;


pub use camera::{
    CameraCapability, CameraError, CameraSelector, DecodeSink, DeviceId, FacingMode, FrameConfig,
};
pub use line_camera::{LineCamera, LINE_DEVICE_ID};
pub use session_log::SessionLog;
pub use submitter::{
    HttpScanSubmitter, ScanSubmitter, TransportError, DEFAULT_RELAY_TIMEOUT_SECS,
};
pub use types::*;

use tokio::sync::{mpsc, watch};

/// Decodes buffered between the capability and the controller
const DECODE_QUEUE_DEPTH: usize = 1;

/// ScannerController instance
pub struct ScannerController<C, S> {
    camera: C,
    submitter: S,
    config: ControllerConfig,
    log: SessionLog,
    state: watch::Sender<ScanState>,
    decode_tx: mpsc::Sender<String>,
    decode_rx: mpsc::Receiver<String>,
    capturing: bool,
    cooldown_pending: bool,
}

impl<C, S> ScannerController<C, S>
where
    C: CameraCapability,
    S: ScanSubmitter,
{
    /// Create new ScannerController
    pub fn new(camera: C, submitter: S, config: ControllerConfig) -> Self {
        let (decode_tx, decode_rx) = mpsc::channel(DECODE_QUEUE_DEPTH);
        let (state, _) = watch::channel(ScanState::default());

        Self {
            camera,
            submitter,
            config,
            log: SessionLog::new(),
            state,
            decode_tx,
            decode_rx,
            capturing: false,
            cooldown_pending: false,
        }
    }

    /// Subscribe to UI state changes
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// Current UI state
    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    pub fn session_log(&self) -> &SessionLog {
        &self.log
    }

    /// Whether the capture stream is running
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Whether the last outcome paused the camera for a cooldown
    pub fn needs_cooldown(&self) -> bool {
        self.cooldown_pending
    }

    /// Start scanning (`Idle -> Scanning`)
    ///
    /// Returns false and stays idle when no camera is available.
    pub async fn mount(&mut self) -> bool {
        self.start_capture().await
    }

    /// Handle one decoded payload
    pub async fn handle_decoded(&mut self, text: &str) -> ScanOutcome {
        if self.state.borrow().processing {
            tracing::debug!(payload = %text, "Scan in flight, decode ignored");
            return ScanOutcome::Ignored;
        }
        self.update(|s| {
            s.processing = true;
            s.phase = ControllerPhase::Processing;
            s.attempts += 1;
        });

        if !self.config.format.is_valid(text) {
            tracing::info!(payload = %text, "Invalid QR code");
            self.show_local_rejection(FeedbackIcon::Error, STATUS_INVALID_FORMAT);
            return ScanOutcome::InvalidFormat;
        }

        if self.log.contains(text) {
            tracing::info!(scanned_id = %text, "Already scanned in this session");
            self.show_local_rejection(FeedbackIcon::Warning, STATUS_SESSION_DUPLICATE);
            return ScanOutcome::SessionDuplicate;
        }

        match self.submitter.submit(text).await {
            Ok(resp) => {
                let feedback = Feedback::from_response(&resp);
                let record = ScanRecord::now(text, feedback.message.clone());
                self.log.push(record.clone());

                tracing::info!(
                    scanned_id = %text,
                    result = %feedback.message,
                    "Scan submitted"
                );

                self.enter_feedback(feedback).await;

                if resp.is_success() {
                    ScanOutcome::Submitted(record)
                } else {
                    ScanOutcome::UpstreamRejected(record)
                }
            }
            Err(e) => {
                tracing::warn!(scanned_id = %text, error = %e, "Scan submission failed");
                let feedback = Feedback::new(FeedbackIcon::Error, STATUS_TRANSPORT_ERROR);

                if self.config.pause_on_transport_error {
                    self.enter_feedback(feedback).await;
                } else {
                    self.show_local_rejection(feedback.icon, feedback.message);
                }

                ScanOutcome::TransportError(e.0)
            }
        }
    }

    /// End the cooldown (`Feedback -> Scanning`)
    ///
    /// Clears feedback and the in-flight flag, then restarts capture if a
    /// camera is still available.
    pub async fn finish_cooldown(&mut self) {
        self.cooldown_pending = false;
        self.update(|s| {
            s.status.clear();
            s.feedback_icon = FeedbackIcon::None;
            s.processing = false;
            s.phase = ControllerPhase::Idle;
        });
        self.start_capture().await;
    }

    /// Stop and release the capture stream (`any -> Stopped`)
    pub async fn teardown(&mut self) {
        self.release_camera().await;
        self.update(|s| s.phase = ControllerPhase::Stopped);
        tracing::info!(scans = self.log.len(), "Scanner stopped");
    }

    /// Run the scan loop until `shutdown` turns true
    ///
    /// A pending relay call always runs to completion. Shutdown during the
    /// cooldown skips the resume. Teardown runs on every exit path.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        if !*shutdown.borrow() {
            self.mount().await;
        }

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                decoded = self.decode_rx.recv() => {
                    let Some(text) = decoded else { break };
                    self.handle_decoded(&text).await;
                    self.drop_pending_decodes();

                    if self.cooldown_pending {
                        tokio::select! {
                            _ = tokio::time::sleep(self.config.cooldown) => {
                                self.drop_pending_decodes();
                                self.finish_cooldown().await;
                            }
                            _ = wait_for_shutdown(&mut shutdown) => break,
                        }
                    }
                }
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }

        self.teardown().await;
        self
    }

    async fn start_capture(&mut self) -> bool {
        let devices = match self.camera.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(error = %e, "Camera enumeration failed");
                Vec::new()
            }
        };

        if devices.is_empty() {
            tracing::info!("No camera available, scanner idle");
            return false;
        }

        let sink = DecodeSink::new(self.decode_tx.clone());
        match self
            .camera
            .start(self.config.selector.clone(), self.config.frame, sink)
            .await
        {
            Ok(()) => {
                self.capturing = true;
                self.update(|s| s.phase = ControllerPhase::Scanning);
                tracing::info!(
                    devices = devices.len(),
                    fps = self.config.frame.fps,
                    "Camera capture started"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera start failed");
                false
            }
        }
    }

    async fn release_camera(&mut self) {
        if let Err(e) = self.camera.stop().await {
            tracing::warn!(error = %e, "Camera stop failed");
        }
        if let Err(e) = self.camera.clear().await {
            tracing::warn!(error = %e, "Camera clear failed");
        }
        self.capturing = false;
    }

    /// Show an outcome, pause the camera and arm the cooldown
    async fn enter_feedback(&mut self, feedback: Feedback) {
        self.update(|s| {
            s.feedback_icon = feedback.icon;
            s.status = feedback.message;
            s.phase = ControllerPhase::Feedback;
        });
        self.release_camera().await;
        self.cooldown_pending = true;
    }

    /// Show an outcome without touching the camera
    fn show_local_rejection(&mut self, icon: FeedbackIcon, status: impl Into<String>) {
        let phase = if self.capturing {
            ControllerPhase::Scanning
        } else {
            ControllerPhase::Idle
        };
        let status = status.into();
        self.update(|s| {
            s.feedback_icon = icon;
            s.status = status;
            s.processing = false;
            s.phase = phase;
        });
    }

    fn drop_pending_decodes(&mut self) -> usize {
        let mut dropped = 0;
        while self.decode_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped decodes received while busy");
        }
        dropped
    }

    fn update(&self, f: impl FnOnce(&mut ScanState)) {
        self.state.send_modify(f);
    }
}

/// Resolves once shutdown is requested or its sender is gone
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
