//! Prometheus metrics for the agent pipeline.
//!
//! The exporter runs its own HTTP listener, enabled by `VIGIL_METRICS_ADDR`
//! (for example `0.0.0.0:9464`). Without it the recorder is not installed
//! and every `record_*` call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Metric name constants for consistency.
pub mod names {
    // Capture metrics
    pub const FRAMES_CAPTURED_TOTAL: &str = "vigil_frames_captured_total";
    pub const FRAMES_DROPPED_TOTAL: &str = "vigil_frames_dropped_total";

    // Pipeline metrics
    pub const FRAMES_PROCESSED_TOTAL: &str = "vigil_frames_processed_total";
    pub const OBSERVATIONS_TOTAL: &str = "vigil_observations_total";
    pub const TRACKS_LIVE: &str = "vigil_tracks_live";
    pub const ALERTS_FIRED_TOTAL: &str = "vigil_alerts_fired_total";
    pub const DETECTOR_FAILURES_TOTAL: &str = "vigil_detector_failures_total";
}

/// Install the Prometheus exporter when `VIGIL_METRICS_ADDR` is set.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics() -> anyhow::Result<Option<SocketAddr>> {
    let Ok(raw) = std::env::var("VIGIL_METRICS_ADDR") else {
        return Ok(None);
    };
    let addr: SocketAddr = raw
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid VIGIL_METRICS_ADDR {raw:?}: {e}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(Some(addr))
}

/// Record a frame handed to the buffer by capture.
pub fn record_frame_captured() {
    counter!(names::FRAMES_CAPTURED_TOTAL).increment(1);
}

/// Record a frame the full buffer evicted unprocessed.
pub fn record_frame_dropped() {
    counter!(names::FRAMES_DROPPED_TOTAL).increment(1);
}

/// Record one fully processed frame and its observation count.
pub fn record_frame_processed(observations: usize) {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
    counter!(names::OBSERVATIONS_TOTAL).increment(observations as u64);
}

/// Update the live-track gauge.
pub fn set_live_tracks(count: usize) {
    gauge!(names::TRACKS_LIVE).set(count as f64);
}

/// Record an alert emitted by the decision stage.
pub fn record_alert_fired() {
    counter!(names::ALERTS_FIRED_TOTAL).increment(1);
}

/// Record a detector failure observed by the pipeline.
pub fn record_detector_failure() {
    counter!(names::DETECTOR_FAILURES_TOTAL).increment(1);
}
