//! Shared data models for the vigil security pipeline.
//!
//! This crate provides the value types exchanged between the engine,
//! dispatcher, and agent:
//! - Bounding boxes and face embeddings
//! - Per-frame face observations with recognition verdicts
//! - Track identifiers and read-only track snapshots
//! - Alert events handed to the dispatch boundary

pub mod alert;
pub mod bbox;
pub mod embedding;
pub mod observation;
pub mod track;

// Re-export common types
pub use alert::{AlertEvent, AlertId, AlertLabel, FrameMeta};
pub use bbox::BoundingBox;
pub use embedding::Embedding;
pub use observation::FaceObservation;
pub use track::{TrackId, TrackSnapshot};
