//! Alert delivery seam.

use async_trait::async_trait;
use tracing::info;
use vigil_models::AlertEvent;

use crate::error::DispatchResult;

/// Destination for fired alerts.
///
/// Implementations persist the snapshot photo and deliver the notification
/// (email, webhook, pager). They are invoked only from the dispatch worker,
/// never from the frame loop, and may block on I/O freely. One call per
/// attempt: the worker wraps `deliver` in the retry policy.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one alert.
    async fn deliver(&self, event: &AlertEvent) -> DispatchResult<()>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Sink that writes the serialized alert to the log.
///
/// The default for development and the synthetic self-check run; also
/// useful as a tee target in tests.
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, event: &AlertEvent) -> DispatchResult<()> {
        let payload = serde_json::to_string(event)?;
        info!(
            alert = %event.id,
            track = %event.track,
            label = %event.label,
            %payload,
            "alert"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
