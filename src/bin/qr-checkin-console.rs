//! QR Check-in Console
//!
//! Terminal scanner host: reads decoded codes line by line from standard
//! input (keyboard-wedge scanners), submits them through the relay and
//! prints feedback and the session log.
//!
//! ```bash
//! qr-checkin-console --relay-url http://localhost:8080
//! ```

use anyhow::Result;
use clap::Parser;
use colored::*;
use qr_checkin::qr_format::{QrFormat, DEFAULT_MAX, DEFAULT_MIN, DEFAULT_PREFIX};
use qr_checkin::scanner_controller::{
    ControllerConfig, ControllerPhase, FeedbackIcon, HttpScanSubmitter, LineCamera, ScanState,
    ScannerController, DEFAULT_RELAY_TIMEOUT_SECS,
};
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "qr-checkin-console")]
#[command(about = "Scan QR check-in codes from a keyboard-wedge scanner")]
struct Args {
    /// Relay base URL
    #[arg(long, env = "RELAY_URL", default_value = "http://localhost:8080")]
    relay_url: String,

    /// Feedback window with scanning paused (seconds)
    #[arg(long, default_value_t = 3)]
    cooldown_secs: u64,

    /// Relay request timeout (seconds)
    #[arg(long, default_value_t = DEFAULT_RELAY_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Ticket code prefix
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Lowest accepted ticket number
    #[arg(long, default_value_t = DEFAULT_MIN)]
    min: u16,

    /// Highest accepted ticket number
    #[arg(long, default_value_t = DEFAULT_MAX)]
    max: u16,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qr_checkin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = ControllerConfig {
        format: QrFormat::new(&args.prefix, args.min, args.max)?,
        cooldown: Duration::from_secs(args.cooldown_secs),
        ..ControllerConfig::default()
    };
    let submitter =
        HttpScanSubmitter::new(&args.relay_url, Duration::from_secs(args.timeout_secs))?;
    let (camera, input_closed) = LineCamera::spawn(BufReader::new(tokio::io::stdin()));

    println!("{}", "=== QR Check-in ===".bold());
    println!("Relay: {}", submitter.url().cyan());
    println!("Scan a code (Ctrl-D to finish)");

    let controller = ScannerController::new(camera, submitter, config);
    tokio::spawn(render(controller.subscribe()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = input_closed => {}
        }
        let _ = shutdown_tx.send(true);
    });

    let controller = controller.run(shutdown_rx).await;

    let log = controller.session_log();
    println!();
    println!("{}", format!("Session log ({} entries)", log.len()).bold());
    for entry in log.entries() {
        println!("  {}", entry);
    }

    Ok(())
}

/// Print the feedback of each handled scan
async fn render(mut states: watch::Receiver<ScanState>) {
    let mut shown = 0;
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        if state.attempts == shown
            || state.status.is_empty()
            || state.phase == ControllerPhase::Processing
        {
            continue;
        }
        shown = state.attempts;

        let line = format!("{} Status: {}", state.feedback_icon.glyph(), state.status);
        let line = match state.feedback_icon {
            FeedbackIcon::Success => line.green(),
            FeedbackIcon::Warning => line.yellow(),
            FeedbackIcon::Error => line.red(),
            FeedbackIcon::None => line.normal(),
        };
        println!("{}", line);
    }
}
