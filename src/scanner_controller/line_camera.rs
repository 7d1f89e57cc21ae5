//! LineCamera - line-oriented decode source
//!
//! Keyboard-wedge and handheld scanners "type" each decoded code followed by
//! Enter. This capability reads such lines from any async reader and, while
//! started, forwards each one as a decoded payload. Lines arriving while the
//! camera is stopped are discarded, the same as frames of a paused camera.

use super::camera::{CameraCapability, CameraError, CameraSelector, DecodeSink, DeviceId, FrameConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;

/// Device id reported by the line reader
pub const LINE_DEVICE_ID: &str = "line-input";

/// LineCamera instance
pub struct LineCamera {
    sink: Arc<Mutex<Option<DecodeSink>>>,
    closed: Arc<AtomicBool>,
}

impl LineCamera {
    /// Spawn the reader task
    ///
    /// The returned receiver fires once the input reaches end of file.
    pub fn spawn<R>(reader: R) -> (Self, oneshot::Receiver<()>)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let sink: Arc<Mutex<Option<DecodeSink>>> = Arc::new(Mutex::new(None));
        let closed = Arc::new(AtomicBool::new(false));
        let (eof_tx, eof_rx) = oneshot::channel();

        let task_sink = sink.clone();
        let task_closed = closed.clone();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let text = line.trim();
                        if text.is_empty() {
                            continue;
                        }
                        let active = lock(&task_sink).clone();
                        match active {
                            Some(sink) => {
                                sink.deliver(text);
                            }
                            None => {
                                tracing::debug!(payload = %text, "Input discarded (camera stopped)");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Line input failed");
                        break;
                    }
                }
            }
            task_closed.store(true, Ordering::SeqCst);
            let _ = eof_tx.send(());
        });

        (Self { sink, closed }, eof_rx)
    }

    /// Whether capture is currently running
    pub fn is_started(&self) -> bool {
        lock(&self.sink).is_some()
    }
}

fn lock(sink: &Mutex<Option<DecodeSink>>) -> MutexGuard<'_, Option<DecodeSink>> {
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CameraCapability for LineCamera {
    async fn list_devices(&self) -> Result<Vec<DeviceId>, CameraError> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![LINE_DEVICE_ID.to_string()])
    }

    async fn start(
        &self,
        selector: CameraSelector,
        _frame: FrameConfig,
        sink: DecodeSink,
    ) -> Result<(), CameraError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CameraError::Unavailable);
        }
        // Any facing mode maps to the single line device
        if let CameraSelector::Device(id) = &selector {
            if id != LINE_DEVICE_ID {
                return Err(CameraError::Device(format!("Unknown device: {}", id)));
            }
        }
        *lock(&self.sink) = Some(sink);
        Ok(())
    }

    async fn stop(&self) -> Result<(), CameraError> {
        lock(&self.sink).take();
        Ok(())
    }

    async fn clear(&self) -> Result<(), CameraError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner_controller::camera::FacingMode;
    use tokio::io::AsyncWriteExt;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_forwards_lines_while_started() {
        let (mut writer, reader) = tokio::io::duplex(256);
        let (camera, _eof) = LineCamera::spawn(tokio::io::BufReader::new(reader));
        let (tx, mut rx) = mpsc::channel(4);

        camera
            .start(CameraSelector::default(), FrameConfig::default(), DecodeSink::new(tx))
            .await
            .unwrap();
        assert!(camera.is_started());

        writer.write_all(b"  EVENT2025-007 \r\n\n").await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("EVENT2025-007"));
    }

    #[tokio::test]
    async fn test_eof_reports_no_devices() {
        let (camera, eof) = LineCamera::spawn(&b"EVENT2025-001\n"[..]);
        eof.await.unwrap();

        assert!(camera.list_devices().await.unwrap().is_empty());
        let (tx, _rx) = mpsc::channel(1);
        let result = camera
            .start(CameraSelector::default(), FrameConfig::default(), DecodeSink::new(tx))
            .await;
        assert!(matches!(result, Err(CameraError::Unavailable)));
    }

    #[tokio::test]
    async fn test_device_selection() {
        let (_writer, reader) = tokio::io::duplex(64);
        let (camera, _eof) = LineCamera::spawn(tokio::io::BufReader::new(reader));
        let (tx, _rx) = mpsc::channel(1);

        let result = camera
            .start(
                CameraSelector::Device("usb-cam-2".to_string()),
                FrameConfig::default(),
                DecodeSink::new(tx.clone()),
            )
            .await;
        assert!(matches!(result, Err(CameraError::Device(_))));
        assert!(!camera.is_started());

        camera
            .start(
                CameraSelector::FacingMode(FacingMode::User),
                FrameConfig::default(),
                DecodeSink::new(tx.clone()),
            )
            .await
            .unwrap();
        camera.stop().await.unwrap();

        camera
            .start(
                CameraSelector::Device(LINE_DEVICE_ID.to_string()),
                FrameConfig::default(),
                DecodeSink::new(tx),
            )
            .await
            .unwrap();
        assert!(camera.is_started());
    }

    #[tokio::test]
    async fn test_stop_detaches_sink() {
        let (_writer, reader) = tokio::io::duplex(64);
        let (camera, _eof) = LineCamera::spawn(tokio::io::BufReader::new(reader));
        let (tx, _rx) = mpsc::channel(1);

        assert_eq!(camera.list_devices().await.unwrap(), vec![LINE_DEVICE_ID.to_string()]);
        camera
            .start(CameraSelector::default(), FrameConfig::default(), DecodeSink::new(tx))
            .await
            .unwrap();
        camera.stop().await.unwrap();
        assert!(!camera.is_started());
    }
}
