//! Dispatch metrics.
//!
//! Counters for the three ways a queued alert can end up, plus delivery
//! latency. Registered through the global `metrics` recorder installed by
//! the binary.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Alerts delivered by the sink, including after retries.
    pub const ALERTS_DELIVERED_TOTAL: &str = "vigil_alerts_delivered_total";

    /// Alerts that exhausted their retry budget.
    pub const ALERTS_FAILED_TOTAL: &str = "vigil_alerts_failed_total";

    /// Alerts dropped at the queue boundary (full or closed).
    pub const ALERTS_DROPPED_TOTAL: &str = "vigil_alerts_dropped_total";

    /// End-to-end delivery time per alert, retries included.
    pub const DELIVERY_SECONDS: &str = "vigil_alert_delivery_seconds";
}

/// Record a successful delivery.
pub fn record_delivered(sink: &'static str, duration_secs: f64) {
    counter!(names::ALERTS_DELIVERED_TOTAL, "sink" => sink).increment(1);
    histogram!(names::DELIVERY_SECONDS, "sink" => sink).record(duration_secs);
}

/// Record a permanently failed delivery.
pub fn record_failed(sink: &'static str) {
    counter!(names::ALERTS_FAILED_TOTAL, "sink" => sink).increment(1);
}

/// Record an alert dropped before it reached the worker.
pub fn record_dropped(reason: &'static str) {
    counter!(names::ALERTS_DROPPED_TOTAL, "reason" => reason).increment(1);
}
