//! Identity-persistence and alert-decision engine.
//!
//! This crate provides:
//! - Motion-adaptive frame sampling
//! - Track registry matching faces across processed frames
//! - Offender memory shortening the debounce for returning faces
//! - Alert debounce and cooldown policy
//! - Authorized-face watchlist
//! - Per-frame pipeline orchestration behind detector/motion/clock seams
//!
//! Everything here is synchronous and runs on one logical thread; the async
//! boundary (frame buffering, alert delivery) lives in the surrounding
//! crates.

pub mod config;
pub mod decision;
pub mod error;
pub mod offenders;
pub mod pipeline;
pub mod registry;
pub mod sampler;
pub mod watchlist;

pub use config::EngineConfig;
pub use decision::AlertDecision;
pub use error::{EngineError, EngineResult};
pub use offenders::{OffenderMemory, OffenderRecord};
pub use pipeline::{
    Clock, FaceDetector, FrameOutcome, FramePipeline, MonotonicClock, MotionSensor,
};
pub use registry::TrackRegistry;
pub use sampler::FrameSampler;
pub use watchlist::Watchlist;
