//! Gallery of authorized faces.
//!
//! Integrations enroll one or more signature embeddings per person (several
//! reference photos of the same face are common) and use [`Watchlist::classify`]
//! to turn a raw detection into a recognized or unrecognized observation.

use tracing::debug;
use vigil_models::{BoundingBox, Embedding, FaceObservation};

#[derive(Debug, Clone)]
struct WatchlistEntry {
    name: String,
    signature: Embedding,
}

/// Authorized-face gallery with a shared match tolerance.
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
    tolerance: f64,
}

impl Watchlist {
    pub fn new(tolerance: f64) -> Self {
        Self {
            entries: Vec::new(),
            tolerance,
        }
    }

    /// Add a signature for `name`. Repeated names accumulate signatures.
    pub fn enroll(&mut self, name: impl Into<String>, signature: Embedding) {
        let name = name.into();
        if !signature.is_valid() {
            debug!(%name, "skipping enrollment with invalid signature");
            return;
        }
        self.entries.push(WatchlistEntry { name, signature });
    }

    /// Name of the closest enrolled signature within tolerance, if any.
    pub fn identify(&self, embedding: &Embedding) -> Option<&str> {
        if !embedding.is_valid() {
            return None;
        }
        self.entries
            .iter()
            .map(|entry| (entry, entry.signature.distance(embedding)))
            .filter(|(_, distance)| *distance <= self.tolerance)
            .min_by(|(_, da), (_, db)| da.total_cmp(db))
            .map(|(entry, _)| entry.name.as_str())
    }

    /// Turn a raw detection into an observation, attaching the embedding
    /// either way so downstream matching and offender memory can use it.
    pub fn classify(&self, bbox: BoundingBox, embedding: Embedding) -> FaceObservation {
        match self.identify(&embedding) {
            Some(name) => FaceObservation::recognized(bbox, name).with_embedding(embedding),
            None => FaceObservation::unrecognized(bbox).with_embedding(embedding),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
