//! Synthetic camera feed for self-check runs.
//!
//! Scripts a short home-entry scene so the binary can demonstrate the full
//! pipeline without camera hardware: an empty porch, the resident passing
//! through, a brief sensor glitch, then an intruder loitering at the door
//! until the feed ends. With default thresholds the intruder produces the
//! first alert about five seconds in and re-alerts on the cooldown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info};
use vigil_engine::{EngineError, EngineResult, FaceDetector, MotionSensor, Watchlist};
use vigil_models::{BoundingBox, Embedding, FaceObservation, FrameMeta};

use crate::frame_buffer::{FrameBuffer, PushResult};
use crate::metrics;
use crate::runner::CapturedFrame;

const EMBEDDING_DIM: usize = 8;
const RESIDENT_NAME: &str = "resident";

// Scene phases as fractions of the feed duration.
const RESIDENT_ENTERS: f64 = 0.15;
const RESIDENT_LEAVES: f64 = 0.35;
const GLITCH_STARTS: f64 = 0.38;
const GLITCH_ENDS: f64 = 0.40;
const INTRUDER_ENTERS: f64 = 0.45;

/// One synthetic frame: raw detections plus the scene's motion flag.
#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    faces: Vec<(BoundingBox, Embedding)>,
    motion: bool,
    sensor_glitch: bool,
}

/// The resident's enrolled face signature.
fn resident_signature() -> Embedding {
    let mut values = vec![0.0f32; EMBEDDING_DIM];
    values[0] = 1.0;
    Embedding::new(values)
}

/// The intruder's face signature, far from every enrolled one.
fn intruder_signature() -> Embedding {
    let mut values = vec![0.0f32; EMBEDDING_DIM];
    values[1] = 1.0;
    Embedding::new(values)
}

/// Per-frame measurement noise on a face signature.
fn jittered(signature: &Embedding, rng: &mut StdRng) -> Embedding {
    Embedding::new(
        signature
            .as_slice()
            .iter()
            .map(|v| v + rng.random_range(-0.02..0.02f32))
            .collect(),
    )
}

/// Synthesize the scene at `fraction` of the way through the feed.
fn frame_at(fraction: f64, rng: &mut StdRng) -> SyntheticFrame {
    if (GLITCH_STARTS..GLITCH_ENDS).contains(&fraction) {
        return SyntheticFrame {
            faces: Vec::new(),
            motion: true,
            sensor_glitch: true,
        };
    }

    if (RESIDENT_ENTERS..RESIDENT_LEAVES).contains(&fraction) {
        // Resident walks left to right across the doorway.
        let progress = (fraction - RESIDENT_ENTERS) / (RESIDENT_LEAVES - RESIDENT_ENTERS);
        let bbox = BoundingBox::new(
            100.0 + 400.0 * progress + rng.random_range(-4.0..4.0),
            180.0 + rng.random_range(-4.0..4.0),
            64.0,
            64.0,
        );
        return SyntheticFrame {
            faces: vec![(bbox, jittered(&resident_signature(), rng))],
            motion: true,
            sensor_glitch: false,
        };
    }

    if fraction >= INTRUDER_ENTERS {
        // Intruder loiters at the door, shifting slightly frame to frame.
        let bbox = BoundingBox::new(
            300.0 + rng.random_range(-8.0..8.0),
            200.0 + rng.random_range(-8.0..8.0),
            64.0,
            64.0,
        );
        return SyntheticFrame {
            faces: vec![(bbox, jittered(&intruder_signature(), rng))],
            motion: true,
            sensor_glitch: false,
        };
    }

    SyntheticFrame {
        faces: Vec::new(),
        motion: false,
        sensor_glitch: false,
    }
}

/// Detector over synthetic frames: classifies each scripted face against
/// the watchlist and fails on scripted sensor glitches.
pub struct SyntheticDetector {
    watchlist: Watchlist,
}

impl SyntheticDetector {
    pub fn new(watchlist: Watchlist) -> Self {
        Self { watchlist }
    }
}

impl FaceDetector<SyntheticFrame> for SyntheticDetector {
    fn detect(&mut self, frame: &SyntheticFrame) -> EngineResult<Vec<FaceObservation>> {
        if frame.sensor_glitch {
            return Err(EngineError::detector_failed("synthetic sensor glitch"));
        }
        Ok(frame
            .faces
            .iter()
            .map(|(bbox, embedding)| self.watchlist.classify(*bbox, embedding.clone()))
            .collect())
    }
}

/// Motion flag straight off the scripted scene.
pub struct SyntheticMotion;

impl MotionSensor<SyntheticFrame> for SyntheticMotion {
    fn sense(&mut self, frame: &SyntheticFrame) -> bool {
        frame.motion
    }
}

/// Paced producer pushing the scripted scene into the frame buffer.
pub struct ScenarioFeed {
    fps: u32,
    duration: Duration,
}

impl ScenarioFeed {
    pub fn new(fps: u32, duration: Duration) -> Self {
        Self {
            fps: fps.max(1),
            duration,
        }
    }

    /// Watchlist with the scenario's resident enrolled.
    pub fn watchlist(tolerance: f64) -> Watchlist {
        let mut watchlist = Watchlist::new(tolerance);
        watchlist.enroll(RESIDENT_NAME, resident_signature());
        watchlist
    }

    /// Emit frames at the configured rate until the script runs out or
    /// shutdown flips, then close the buffer so the consumer drains out.
    pub async fn run(
        self,
        buffer: Arc<FrameBuffer<CapturedFrame<SyntheticFrame>>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let total_frames = u64::from(self.fps) * self.duration.as_secs().max(1);
        let mut ticker = tokio::time::interval(Duration::from_secs(1) / self.fps);
        let mut rng = StdRng::from_os_rng();

        info!(fps = self.fps, total_frames, "synthetic feed started");
        for seq in 0..total_frames {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(seq, "synthetic feed stopping on shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let fraction = seq as f64 / total_frames as f64;
                    let frame = frame_at(fraction, &mut rng);
                    metrics::record_frame_captured();
                    let meta = FrameMeta::new(seq, Utc::now());
                    if buffer.push(CapturedFrame { frame, meta }).await == PushResult::Evicted {
                        metrics::record_frame_dropped();
                        debug!(seq, "capture outpaced processing, dropped oldest frame");
                    }
                }
            }
        }
        buffer.close().await;
        let buffered = buffer.len().await;
        info!(buffered, "synthetic feed finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_watchlist_knows_resident_not_intruder() {
        let watchlist = ScenarioFeed::watchlist(0.6);
        let mut rng = rng();

        let resident = jittered(&resident_signature(), &mut rng);
        assert_eq!(watchlist.identify(&resident), Some(RESIDENT_NAME));

        let intruder = jittered(&intruder_signature(), &mut rng);
        assert_eq!(watchlist.identify(&intruder), None);
    }

    #[test]
    fn test_script_phases() {
        let mut rng = rng();

        let empty = frame_at(0.05, &mut rng);
        assert!(empty.faces.is_empty());
        assert!(!empty.motion);

        let resident = frame_at(0.25, &mut rng);
        assert_eq!(resident.faces.len(), 1);
        assert!(resident.motion);

        let glitch = frame_at(0.39, &mut rng);
        assert!(glitch.sensor_glitch);

        let intruder = frame_at(0.8, &mut rng);
        assert_eq!(intruder.faces.len(), 1);
        assert!(!intruder.sensor_glitch);
    }

    #[test]
    fn test_detector_classifies_script_faces() {
        let mut detector = SyntheticDetector::new(ScenarioFeed::watchlist(0.6));
        let mut rng = rng();

        let observations = detector.detect(&frame_at(0.25, &mut rng)).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].identity.as_deref(), Some(RESIDENT_NAME));

        let observations = detector.detect(&frame_at(0.8, &mut rng)).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].identity, None);
        assert!(observations[0].embedding.is_some());

        assert!(detector.detect(&frame_at(0.39, &mut rng)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_pushes_every_frame_then_closes() {
        let feed = ScenarioFeed::new(10, Duration::from_secs(2));
        let buffer = Arc::new(FrameBuffer::new(64));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        feed.run(Arc::clone(&buffer), shutdown_rx).await;

        let mut seen = 0u64;
        while let Some(captured) = buffer.pop().await {
            assert_eq!(captured.meta.seq, seen);
            seen += 1;
        }
        assert_eq!(seen, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_stops_on_shutdown() {
        let feed = ScenarioFeed::new(10, Duration::from_secs(60));
        let buffer = Arc::new(FrameBuffer::new(1024));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        shutdown_tx.send(true).expect("feed is subscribed");
        feed.run(Arc::clone(&buffer), shutdown_rx).await;

        // Far fewer than the scripted 600 frames, and the buffer is closed.
        assert!(buffer.len().await < 600);
        assert_eq!(buffer.push(dummy_frame()).await, PushResult::Closed);
    }

    fn dummy_frame() -> CapturedFrame<SyntheticFrame> {
        CapturedFrame {
            frame: SyntheticFrame {
                faces: Vec::new(),
                motion: false,
                sensor_glitch: false,
            },
            meta: FrameMeta::new(0, Utc::now()),
        }
    }
}
