//! Track registry maintaining face identity across processed frames.
//!
//! Observations are matched to live tracks by bounding-box center distance,
//! globally best pair first. When two candidate pairs are spatially too
//! close to call, embedding distance breaks the tie so crossing faces keep
//! their own tracks.

use std::time::Instant;

use tracing::{debug, trace};
use vigil_models::{BoundingBox, Embedding, FaceObservation, TrackId, TrackSnapshot};

/// Fraction of the match threshold treated as a spatial tie between
/// candidate pairs.
const TIE_BREAK_WINDOW: f64 = 0.1;

/// Internal per-face state. Snapshots of this are what leave the registry.
#[derive(Debug, Clone)]
pub(crate) struct Track {
    pub(crate) id: TrackId,
    pub(crate) bbox: BoundingBox,
    pub(crate) first_seen: Instant,
    pub(crate) last_seen: Instant,
    /// Sticky: once a track is recognized it can never become a threat again.
    pub(crate) ever_authorized: bool,
    /// Start of the current unbroken run of unrecognized observations.
    pub(crate) unauthorized_since: Option<Instant>,
    pub(crate) last_alert_at: Option<Instant>,
    pub(crate) embedding: Option<Embedding>,
    pub(crate) identity: Option<String>,
    /// Processed frames since this track last matched an observation.
    frames_since_match: u32,
}

impl Track {
    fn spawn(id: TrackId, observation: &FaceObservation, now: Instant) -> Self {
        let mut track = Self {
            id,
            bbox: observation.bbox,
            first_seen: now,
            last_seen: now,
            ever_authorized: false,
            unauthorized_since: None,
            last_alert_at: None,
            embedding: None,
            identity: None,
            frames_since_match: 0,
        };
        track.apply(observation, now);
        track
    }

    fn apply(&mut self, observation: &FaceObservation, now: Instant) {
        self.bbox = observation.bbox;
        self.last_seen = now;
        self.frames_since_match = 0;

        if let Some(name) = &observation.identity {
            if !self.ever_authorized {
                debug!(track = %self.id, identity = %name, "track authorized");
            }
            self.ever_authorized = true;
            self.unauthorized_since = None;
            self.identity = Some(name.clone());
        } else if !self.ever_authorized {
            if self.unauthorized_since.is_none() {
                self.unauthorized_since = Some(now);
            }
            if let Some(embedding) = &observation.embedding {
                if embedding.is_valid() {
                    self.embedding = Some(embedding.clone());
                }
            }
        }
    }

    fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            id: self.id,
            bbox: self.bbox,
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            ever_authorized: self.ever_authorized,
            unauthorized_since: self.unauthorized_since,
            last_alert_at: self.last_alert_at,
            embedding: self.embedding.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Registry of live tracks, updated once per processed frame.
pub struct TrackRegistry {
    /// Maximum center distance for an observation to claim a track.
    match_distance_threshold: f64,
    /// Missed processed frames a track survives before deletion.
    prune_grace_frames: u32,
    tracks: Vec<Track>,
    /// Next track ID to assign. Never reused, even after pruning.
    next_track_id: u64,
}

impl TrackRegistry {
    pub fn new(match_distance_threshold: f64, prune_grace_frames: u32) -> Self {
        Self {
            match_distance_threshold,
            prune_grace_frames,
            tracks: Vec::new(),
            next_track_id: 0,
        }
    }

    /// Update tracks with the observations of one processed frame.
    ///
    /// Must also be called with an empty slice when detection yields nothing
    /// (or fails), so unmatched tracks keep aging toward pruning.
    ///
    /// Returns snapshots of every live track after the update.
    pub fn update(
        &mut self,
        observations: &[FaceObservation],
        now: Instant,
    ) -> Vec<TrackSnapshot> {
        let valid: Vec<&FaceObservation> = observations
            .iter()
            .filter(|obs| {
                if obs.bbox.is_valid() {
                    true
                } else {
                    debug!(bbox = ?obs.bbox, "dropping observation with degenerate bounding box");
                    false
                }
            })
            .collect();

        let mut track_matched = vec![false; self.tracks.len()];
        let mut obs_matched = vec![false; valid.len()];

        // Candidate pairs under the distance threshold, globally best first.
        // Distances falling in the same tie bucket are ordered by embedding
        // distance instead of raw pixels.
        let bucket_width = self.match_distance_threshold * TIE_BREAK_WINDOW;
        let mut candidates: Vec<(usize, usize, u64, f64, f64)> = Vec::new();
        for (track_idx, track) in self.tracks.iter().enumerate() {
            for (obs_idx, obs) in valid.iter().enumerate() {
                let distance = track.bbox.center_distance(&obs.bbox);
                if distance >= self.match_distance_threshold {
                    continue;
                }
                let bucket = (distance / bucket_width) as u64;
                let embedding_distance = embedding_distance(&track.embedding, &obs.embedding);
                candidates.push((track_idx, obs_idx, bucket, embedding_distance, distance));
            }
        }
        candidates.sort_by(|a, b| {
            a.2.cmp(&b.2)
                .then(a.3.total_cmp(&b.3))
                .then(a.4.total_cmp(&b.4))
        });

        for &(track_idx, obs_idx, _, _, _) in &candidates {
            if track_matched[track_idx] || obs_matched[obs_idx] {
                continue;
            }
            track_matched[track_idx] = true;
            obs_matched[obs_idx] = true;
            self.tracks[track_idx].apply(valid[obs_idx], now);
        }

        // Age unmatched tracks, then drop the ones past the grace window.
        for (track_idx, track) in self.tracks.iter_mut().enumerate() {
            if !track_matched[track_idx] {
                track.frames_since_match += 1;
            }
        }
        let grace = self.prune_grace_frames;
        self.tracks.retain(|track| {
            if track.frames_since_match > grace {
                debug!(track = %track.id, "pruning stale track");
                false
            } else {
                true
            }
        });

        // Spawn tracks for observations nothing claimed.
        for (obs_idx, obs) in valid.iter().enumerate() {
            if obs_matched[obs_idx] {
                continue;
            }
            let id = TrackId(self.next_track_id);
            self.next_track_id += 1;
            trace!(track = %id, bbox = ?obs.bbox, "spawning track");
            self.tracks.push(Track::spawn(id, obs, now));
        }

        self.snapshots()
    }

    /// Snapshots of every live track.
    pub fn snapshots(&self) -> Vec<TrackSnapshot> {
        self.tracks.iter().map(Track::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub(crate) fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> + '_ {
        self.tracks.iter_mut()
    }
}

fn embedding_distance(track: &Option<Embedding>, observation: &Option<Embedding>) -> f64 {
    match (track, observation) {
        (Some(a), Some(b)) => a.distance(b),
        _ => f64::INFINITY,
    }
}
