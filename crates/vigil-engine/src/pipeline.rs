//! Per-frame orchestration and the seams to external collaborators.
//!
//! The pipeline owns the sampler, registry, offender memory, and alert
//! policy, and runs one captured frame at a time through them. Frame
//! acquisition, the detection model, and alert delivery stay behind the
//! traits defined here so the engine itself never touches hardware or I/O.

use std::time::Instant;

use tracing::warn;
use vigil_models::{AlertEvent, FaceObservation, FrameMeta, TrackSnapshot};

use crate::config::EngineConfig;
use crate::decision::AlertDecision;
use crate::error::EngineResult;
use crate::offenders::OffenderMemory;
use crate::registry::TrackRegistry;
use crate::sampler::FrameSampler;

/// Face detection and recognition over one frame.
///
/// A failed detection is not fatal: the pipeline treats it as an empty
/// frame and live tracks age one unmatched step.
pub trait FaceDetector<F>: Send {
    fn detect(&mut self, frame: &F) -> EngineResult<Vec<FaceObservation>>;
}

/// External motion signal driving the adaptive sampling interval.
pub trait MotionSensor<F>: Send {
    fn sense(&mut self, frame: &F) -> bool;
}

/// Time source for every in-core timer.
///
/// All debounce, cooldown, and TTL arithmetic runs on `Instant`s from here,
/// never on wall-clock time, so clock adjustments cannot corrupt state.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// The system monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// What one captured frame produced.
#[derive(Debug)]
pub struct FrameOutcome {
    /// The frame this outcome describes.
    pub frame: FrameMeta,
    /// Whether the sampler selected this frame for full processing. When
    /// false, no other field carries information.
    pub sampled: bool,
    /// Whether the detector failed on this frame (processed as empty).
    pub detector_failed: bool,
    /// Valid observations the detector produced.
    pub observations: usize,
    /// Every live track after this frame's update and alert evaluation.
    pub tracks: Vec<TrackSnapshot>,
    /// Alerts that fired on this frame.
    pub alerts: Vec<AlertEvent>,
}

impl FrameOutcome {
    fn skipped(frame: FrameMeta) -> Self {
        Self {
            frame,
            sampled: false,
            detector_failed: false,
            observations: 0,
            tracks: Vec::new(),
            alerts: Vec::new(),
        }
    }
}

/// Single-threaded frame processing pipeline.
///
/// Exactly one frame is in flight at a time; all track and offender state
/// is owned here and mutated only through [`FramePipeline::process`], so
/// no locking is needed. Run one pipeline per camera.
pub struct FramePipeline<F> {
    detector: Box<dyn FaceDetector<F>>,
    motion: Box<dyn MotionSensor<F>>,
    clock: Box<dyn Clock>,
    sampler: FrameSampler,
    registry: TrackRegistry,
    offenders: OffenderMemory,
    decision: AlertDecision,
}

impl<F> FramePipeline<F> {
    /// Build a pipeline from a validated configuration and its collaborators.
    pub fn new(
        config: &EngineConfig,
        detector: Box<dyn FaceDetector<F>>,
        motion: Box<dyn MotionSensor<F>>,
        clock: Box<dyn Clock>,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            detector,
            motion,
            clock,
            sampler: FrameSampler::new(config.fast_interval_frames, config.slow_interval_frames),
            registry: TrackRegistry::new(
                config.match_distance_threshold,
                config.prune_grace_frames,
            ),
            offenders: OffenderMemory::new(
                config.offender_ttl,
                config.offender_match_tolerance,
                config.offender_max_records,
            ),
            decision: AlertDecision::new(config),
        })
    }

    /// Run one captured frame through sample → detect → track → decide.
    ///
    /// Frames the sampler skips leave all state untouched. A detector error
    /// is downgraded to an empty observation set so the frame still ages and
    /// prunes tracks; the outcome records the failure for the caller's
    /// health tracking.
    pub fn process(&mut self, frame: &F, meta: FrameMeta) -> FrameOutcome {
        let motion = self.motion.sense(frame);
        if !self.sampler.should_process(meta.seq, motion) {
            return FrameOutcome::skipped(meta);
        }

        let now = self.clock.now();
        let (observations, detector_failed) = match self.detector.detect(frame) {
            Ok(observations) => (observations, false),
            Err(error) => {
                warn!(frame = meta.seq, %error, "face detector failed, aging tracks on an empty frame");
                (Vec::new(), true)
            }
        };

        let observed = observations.len();
        self.registry.update(&observations, now);
        let alerts = self
            .decision
            .evaluate(&mut self.registry, &mut self.offenders, meta, now);

        FrameOutcome {
            frame: meta,
            sampled: true,
            detector_failed,
            observations: observed,
            tracks: self.registry.snapshots(),
            alerts,
        }
    }

    /// Number of live tracks.
    pub fn live_tracks(&self) -> usize {
        self.registry.len()
    }

    /// Number of remembered offender signatures.
    pub fn remembered_offenders(&self) -> usize {
        self.offenders.len()
    }
}
