//! Track identifiers and read-only track views.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::embedding::Embedding;

/// Identifier for a live track.
///
/// Ids are allocated from a monotonic counter and never reused, so a new
/// face appearing where a pruned track used to be always gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of a live track, returned by `TrackRegistry::update`.
///
/// All timestamps are monotonic (`Instant`); wall-clock time only appears
/// on outward-facing alert events.
#[derive(Debug, Clone)]
pub struct TrackSnapshot {
    /// Stable identifier, unique among live tracks.
    pub id: TrackId,
    /// Last-known bounding box.
    pub bbox: BoundingBox,
    /// When the track was first created.
    pub first_seen: Instant,
    /// When the track last matched an observation.
    pub last_seen: Instant,
    /// Sticky authorization flag: set by the first recognized observation,
    /// never cleared afterwards.
    pub ever_authorized: bool,
    /// Start of the current continuous unrecognized streak, if any.
    pub unauthorized_since: Option<Instant>,
    /// When this track last fired an alert.
    pub last_alert_at: Option<Instant>,
    /// Latest embedding from an unrecognized observation, for offender
    /// memory lookups.
    pub embedding: Option<Embedding>,
    /// Last recognized identity label, for logging.
    pub identity: Option<String>,
}

impl TrackSnapshot {
    /// Duration of the current unauthorized streak as of `now`.
    pub fn unauthorized_elapsed(&self, now: Instant) -> Option<Duration> {
        self.unauthorized_since
            .map(|since| now.saturating_duration_since(since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_id_display() {
        assert_eq!(TrackId(42).to_string(), "42");
    }

    #[test]
    fn test_unauthorized_elapsed() {
        let t0 = Instant::now();
        let snap = TrackSnapshot {
            id: TrackId(1),
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            first_seen: t0,
            last_seen: t0,
            ever_authorized: false,
            unauthorized_since: Some(t0),
            last_alert_at: None,
            embedding: None,
            identity: None,
        };
        let later = t0 + Duration::from_secs(3);
        assert_eq!(snap.unauthorized_elapsed(later), Some(Duration::from_secs(3)));

        let authorized = TrackSnapshot {
            unauthorized_since: None,
            ..snap
        };
        assert_eq!(authorized.unauthorized_elapsed(later), None);
    }
}
