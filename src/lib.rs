//! QR Check-in Library
//!
//! Attendance check-in by QR code.
//!
//! ## Architecture
//!
//! 1. QrFormat - Ticket code validation
//! 2. ScanRelay - Record store adapter (server side)
//! 3. WebAPI - Relay HTTP endpoints
//! 4. ScannerController - Camera lifecycle, dedup and feedback (client side)
//!
//! ## Flow
//!
//! camera decode -> format check -> session log check -> relay -> record store
//! -> feedback + session log -> cooldown -> camera resume

pub mod error;
pub mod models;
pub mod qr_format;
pub mod scan_relay;
pub mod scanner_controller;
pub mod state;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
