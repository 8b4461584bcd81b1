//! Per-frame face observations.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::embedding::Embedding;

/// A single face detected in one processed frame.
///
/// Observations are ephemeral: they exist only for the duration of the
/// frame's trip through the track registry and carry the recognition
/// verdict as an optional identity label (`Some` = recognized).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    /// Where the face was detected.
    pub bbox: BoundingBox,
    /// Embedding from the recognition model, when it produced one.
    pub embedding: Option<Embedding>,
    /// Recognized identity label, or `None` for an unrecognized face.
    pub identity: Option<String>,
}

impl FaceObservation {
    /// Observation of a face matched to a known identity.
    pub fn recognized(bbox: BoundingBox, identity: impl Into<String>) -> Self {
        Self {
            bbox,
            embedding: None,
            identity: Some(identity.into()),
        }
    }

    /// Observation of a face that matched no known identity.
    pub fn unrecognized(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            embedding: None,
            identity: None,
        }
    }

    /// Attach the model's embedding vector.
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Whether this observation carries a recognized identity.
    pub fn is_recognized(&self) -> bool {
        self.identity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict() {
        let seen = FaceObservation::recognized(BoundingBox::new(0.0, 0.0, 10.0, 10.0), "alice");
        assert!(seen.is_recognized());
        assert_eq!(seen.identity.as_deref(), Some("alice"));

        let unknown = FaceObservation::unrecognized(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert!(!unknown.is_recognized());
    }

    #[test]
    fn test_with_embedding() {
        let obs = FaceObservation::unrecognized(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
            .with_embedding(Embedding::new(vec![0.5; 4]));
        assert_eq!(obs.embedding.as_ref().map(|e| e.len()), Some(4));
    }
}
