//! Alert events handed to the dispatch boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bbox::BoundingBox;
use crate::track::TrackId;

/// Unique identifier for a fired alert, used for dispatch correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub String);

impl AlertId {
    /// Generate a new random alert ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification attached to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLabel {
    /// An unrecognized face persisted past its debounce threshold.
    Unauthorized,
}

impl AlertLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLabel::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for AlertLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the frame an alert was decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMeta {
    /// Frame sequence number from the capture source.
    pub seq: u64,
    /// Wall-clock capture time, for human-facing notifications. In-core
    /// timers never consume this.
    pub captured_at: DateTime<Utc>,
}

impl FrameMeta {
    pub fn new(seq: u64, captured_at: DateTime<Utc>) -> Self {
        Self { seq, captured_at }
    }
}

/// A debounced security alert, consumed exactly once by the dispatcher.
///
/// After emitting one of these, the core retains nothing about it beyond
/// the track's `last_alert_at` and the offender memory upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Unique alert ID.
    pub id: AlertId,
    /// Track that triggered the alert.
    pub track: TrackId,
    /// Frame the decision was made on.
    pub frame: FrameMeta,
    /// Where the face was in that frame.
    pub bbox: BoundingBox,
    /// Alert classification.
    pub label: AlertLabel,
    /// Wall-clock firing time (the triggering frame's capture time).
    pub fired_at: DateTime<Utc>,
}

impl AlertEvent {
    /// Create a new alert event for a track observed in `frame`.
    pub fn new(track: TrackId, frame: FrameMeta, bbox: BoundingBox, label: AlertLabel) -> Self {
        Self {
            id: AlertId::new(),
            track,
            frame,
            bbox,
            label,
            fired_at: frame.captured_at,
        }
    }
}
