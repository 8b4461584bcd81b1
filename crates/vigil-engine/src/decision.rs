//! Alert debouncing over live tracks.
//!
//! A track alerts once its unauthorized streak outlasts a threshold: five
//! seconds by default, shortened to one second when the face matches
//! offender memory. Alerts for the same track are then spaced by a cooldown,
//! so a person who keeps loitering keeps alerting instead of being silenced
//! by the first event.

use std::time::{Duration, Instant};

use tracing::{debug, info, trace};
use vigil_models::{AlertEvent, AlertLabel, FrameMeta};

use crate::config::EngineConfig;
use crate::offenders::OffenderMemory;
use crate::registry::TrackRegistry;

/// Debounce policy applied once per processed frame.
pub struct AlertDecision {
    first_time_threshold: Duration,
    repeat_offender_threshold: Duration,
    alert_cooldown: Duration,
}

impl AlertDecision {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            first_time_threshold: config.first_time_threshold,
            repeat_offender_threshold: config.repeat_offender_threshold,
            alert_cooldown: config.alert_cooldown,
        }
    }

    /// Evaluate every live track and return the alerts that fire now.
    ///
    /// Firing stamps the track's `last_alert_at` and records its embedding
    /// in offender memory, so later sightings of the same face debounce on
    /// the shortened threshold.
    pub fn evaluate(
        &self,
        registry: &mut TrackRegistry,
        offenders: &mut OffenderMemory,
        frame: FrameMeta,
        now: Instant,
    ) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for track in registry.tracks_mut() {
            if track.ever_authorized {
                continue;
            }
            let since = match track.unauthorized_since {
                Some(since) => since,
                None => continue,
            };

            let is_repeat = match &track.embedding {
                Some(embedding) => offenders.lookup(embedding, now).is_some(),
                None => false,
            };
            let threshold = if is_repeat {
                self.repeat_offender_threshold
            } else {
                self.first_time_threshold
            };

            let elapsed = now.saturating_duration_since(since);
            if elapsed < threshold {
                trace!(
                    track = %track.id,
                    streak_secs = elapsed.as_secs_f64(),
                    repeat = is_repeat,
                    "unauthorized streak below threshold"
                );
                continue;
            }

            if let Some(last) = track.last_alert_at {
                let since_last = now.saturating_duration_since(last);
                if since_last < self.alert_cooldown {
                    debug!(
                        track = %track.id,
                        since_last_secs = since_last.as_secs_f64(),
                        "alert suppressed by cooldown"
                    );
                    continue;
                }
            }

            let event = AlertEvent::new(track.id, frame, track.bbox, AlertLabel::Unauthorized);
            track.last_alert_at = Some(now);
            if let Some(embedding) = &track.embedding {
                offenders.upsert(embedding, now);
            }
            info!(
                track = %track.id,
                alert = %event.id,
                repeat = is_repeat,
                streak_secs = elapsed.as_secs_f64(),
                "unauthorized face alert"
            );
            events.push(event);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vigil_models::{BoundingBox, Embedding, FaceObservation, TrackId};

    fn setup(config: &EngineConfig) -> (TrackRegistry, OffenderMemory, AlertDecision) {
        let registry = TrackRegistry::new(
            config.match_distance_threshold,
            config.prune_grace_frames,
        );
        let offenders = OffenderMemory::new(
            config.offender_ttl,
            config.offender_match_tolerance,
            config.offender_max_records,
        );
        (registry, offenders, AlertDecision::new(config))
    }

    fn frame(seq: u64) -> FrameMeta {
        FrameMeta::new(seq, Utc::now())
    }

    fn unknown() -> FaceObservation {
        FaceObservation::unrecognized(BoundingBox::new(100.0, 100.0, 50.0, 50.0))
    }

    fn unknown_with(embedding: &[f32]) -> FaceObservation {
        unknown().with_embedding(Embedding::new(embedding.to_vec()))
    }

    #[test]
    fn test_first_alert_fires_after_threshold() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();

        registry.update(&[unknown()], t0);
        assert!(decision
            .evaluate(&mut registry, &mut offenders, frame(0), t0)
            .is_empty());

        let t4 = t0 + Duration::from_secs(4);
        registry.update(&[unknown()], t4);
        assert!(decision
            .evaluate(&mut registry, &mut offenders, frame(1), t4)
            .is_empty());

        let t5 = t0 + Duration::from_secs(5);
        registry.update(&[unknown()], t5);
        let events = decision.evaluate(&mut registry, &mut offenders, frame(2), t5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].track, TrackId(0));
        assert_eq!(events[0].label, AlertLabel::Unauthorized);
    }

    #[test]
    fn test_cooldown_spaces_realerts() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();

        registry.update(&[unknown()], t0);

        let t5 = t0 + Duration::from_secs(5);
        registry.update(&[unknown()], t5);
        let first = decision.evaluate(&mut registry, &mut offenders, frame(1), t5);
        assert_eq!(first.len(), 1);

        // Still loitering 29s later: inside the cooldown, nothing fires.
        let t34 = t5 + Duration::from_secs(29);
        registry.update(&[unknown()], t34);
        assert!(decision
            .evaluate(&mut registry, &mut offenders, frame(2), t34)
            .is_empty());

        // Cooldown elapsed, same streak: a fresh alert fires.
        let t35 = t5 + Duration::from_secs(30);
        registry.update(&[unknown()], t35);
        let second = decision.evaluate(&mut registry, &mut offenders, frame(3), t35);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].track, TrackId(0));
        assert_ne!(second[0].id, first[0].id);
    }

    #[test]
    fn test_repeat_offender_uses_short_threshold() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();

        // Face already known to offender memory.
        offenders.upsert(&Embedding::new(vec![1.0, 0.0, 0.0]), t0);

        let t60 = t0 + Duration::from_secs(60);
        registry.update(&[unknown_with(&[1.0, 0.05, 0.0])], t60);
        assert!(decision
            .evaluate(&mut registry, &mut offenders, frame(0), t60)
            .is_empty());

        // One second of streak is enough for a remembered face.
        let t61 = t60 + Duration::from_secs(1);
        registry.update(&[unknown_with(&[1.0, 0.05, 0.0])], t61);
        let events = decision.evaluate(&mut registry, &mut offenders, frame(1), t61);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_unmatched_embedding_waits_full_threshold() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();

        offenders.upsert(&Embedding::new(vec![1.0, 0.0, 0.0]), t0);

        // A different face: far from the remembered signature.
        registry.update(&[unknown_with(&[0.0, 1.0, 0.0])], t0);
        let t2 = t0 + Duration::from_secs(2);
        registry.update(&[unknown_with(&[0.0, 1.0, 0.0])], t2);
        assert!(decision
            .evaluate(&mut registry, &mut offenders, frame(1), t2)
            .is_empty());

        let t5 = t0 + Duration::from_secs(5);
        registry.update(&[unknown_with(&[0.0, 1.0, 0.0])], t5);
        assert_eq!(
            decision
                .evaluate(&mut registry, &mut offenders, frame(2), t5)
                .len(),
            1
        );
    }

    #[test]
    fn test_authorized_track_never_alerts() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();
        let bbox = BoundingBox::new(100.0, 100.0, 50.0, 50.0);

        registry.update(&[FaceObservation::recognized(bbox, "alice")], t0);

        let t60 = t0 + Duration::from_secs(60);
        registry.update(&[FaceObservation::unrecognized(bbox)], t60);
        assert!(decision
            .evaluate(&mut registry, &mut offenders, frame(1), t60)
            .is_empty());
    }

    #[test]
    fn test_alert_records_offender_signature() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();

        registry.update(&[unknown_with(&[0.5, 0.5, 0.5])], t0);
        let t5 = t0 + Duration::from_secs(5);
        registry.update(&[unknown_with(&[0.5, 0.5, 0.5])], t5);
        let events = decision.evaluate(&mut registry, &mut offenders, frame(1), t5);

        assert_eq!(events.len(), 1);
        assert_eq!(offenders.len(), 1);
        assert!(offenders
            .lookup(&Embedding::new(vec![0.5, 0.5, 0.5]), t5)
            .is_some());
    }

    #[test]
    fn test_alert_carries_frame_and_bbox() {
        let config = EngineConfig::default();
        let (mut registry, mut offenders, decision) = setup(&config);
        let t0 = Instant::now();

        registry.update(&[unknown()], t0);
        let t5 = t0 + Duration::from_secs(5);
        registry.update(&[unknown()], t5);

        let meta = frame(42);
        let events = decision.evaluate(&mut registry, &mut offenders, meta, t5);
        assert_eq!(events[0].frame.seq, 42);
        assert_eq!(events[0].bbox.x, 100.0);
        assert_eq!(events[0].fired_at, meta.captured_at);
    }
}
