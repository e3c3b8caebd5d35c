//! Check-in scanner demo binary
//!
//! Negotiates a camera start against a simulated phone whose rear camera tops
//! out at 1080p and which has no camera matching a strict `facingMode`.

use checkin_camera_core::{CameraScanner, DeviceConstraints, FacingMode, ScanConfig, StartRejection};
use checkin_camera_runtime::{CameraStartNegotiator, NegotiateParams, NegotiatorConfig, metrics};
use checkin_camera_testing::{MockScanner, ScriptedOutcome, fixtures};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// A phone that only reaches 1080p, on its rear camera, when asked loosely.
fn simulated_phone() -> MockScanner {
    MockScanner::rejecting(StartRejection::named(
        "OverconstrainedError",
        "Requested resolution is not supported",
    ))
    .when(
        |constraints, _| {
            constraints
                .get("facingMode")
                .is_some_and(serde_json::Value::is_object)
        },
        ScriptedOutcome::Reject(StartRejection::named(
            "NotFoundError",
            "Requested device not found",
        )),
    )
    .succeed_when(|constraints, _| constraints.ideal_width().is_some_and(|w| w <= 1920))
    .emit_on_start(&["TICKET-0001", "TICKET-0002"], 25)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkin_scan=info,checkin_camera_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    metrics::register_metrics();

    let config = NegotiatorConfig::from_env();
    info!(
        presets = config.presets.len(),
        attempt_timeout = ?config.attempt_timeout,
        "Configuration loaded"
    );

    let (on_decoded, scanned) = fixtures::collect_decoded();
    let scanner = simulated_phone();
    let negotiator = CameraStartNegotiator::new(config);

    let params = NegotiateParams::new(
        vec![
            DeviceConstraints::facing_exact(FacingMode::Environment),
            DeviceConstraints::facing(FacingMode::Environment),
        ],
        on_decoded,
    )
    .scan_config(ScanConfig::new(10).with_option("qrbox", json!({ "width": 250, "height": 250 })));

    match negotiator.negotiate(&scanner, params).await {
        Ok(result) => {
            info!(
                preset = %result.chosen_preset,
                constraints = %result.effective_constraints,
                attempts = result.attempt_count(),
                "Scanning"
            );
            scanner.deliver("TICKET-0003");
            scanner.stop().await?;

            let scanned = scanned.lock().map(|s| s.clone()).unwrap_or_default();
            info!(tickets = ?scanned, "Scanner stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Camera unavailable, check permissions or close other camera apps");
            Err(e.into())
        }
    }
}
