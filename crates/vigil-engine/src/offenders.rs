//! Short-term memory of faces that already triggered an alert.
//!
//! A face seen here gets the shortened repeat-offender threshold on its next
//! visit. Records carry a running-mean signature embedding and expire after a
//! TTL measured from their last alert.

use std::time::{Duration, Instant};

use tracing::debug;
use vigil_models::Embedding;

/// One remembered offender.
#[derive(Debug, Clone)]
pub struct OffenderRecord {
    /// Running mean of every embedding folded into this record.
    signature: Embedding,
    /// Embeddings folded so far.
    samples: u32,
    last_alert_at: Instant,
}

impl OffenderRecord {
    pub fn signature(&self) -> &Embedding {
        &self.signature
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn last_alert_at(&self) -> Instant {
        self.last_alert_at
    }
}

/// Bounded, TTL-expiring store of offender signatures.
pub struct OffenderMemory {
    records: Vec<OffenderRecord>,
    ttl: Duration,
    match_tolerance: f64,
    max_records: usize,
}

impl OffenderMemory {
    pub fn new(ttl: Duration, match_tolerance: f64, max_records: usize) -> Self {
        Self {
            records: Vec::new(),
            ttl,
            match_tolerance,
            max_records: max_records.max(1),
        }
    }

    /// Best unexpired record within tolerance of `embedding`.
    ///
    /// Closest signature wins; among equally close records the most recently
    /// alerted one is preferred. Expired records never match, even before
    /// they are physically removed.
    pub fn lookup(&self, embedding: &Embedding, now: Instant) -> Option<&OffenderRecord> {
        if !embedding.is_valid() {
            return None;
        }
        self.records
            .iter()
            .filter(|record| !self.is_expired(record, now))
            .filter_map(|record| {
                let distance = record.signature.distance(embedding);
                (distance <= self.match_tolerance).then_some((record, distance))
            })
            .min_by(|(a, da), (b, db)| {
                da.total_cmp(db)
                    .then_with(|| b.last_alert_at.cmp(&a.last_alert_at))
            })
            .map(|(record, _)| record)
    }

    /// Fold `embedding` into the matching record, or insert a new one.
    ///
    /// Expired records are swept here; when the store is still full after the
    /// sweep, the stalest record makes room.
    pub fn upsert(&mut self, embedding: &Embedding, now: Instant) {
        if !embedding.is_valid() {
            return;
        }
        self.records.retain(|record| {
            if now.saturating_duration_since(record.last_alert_at) > self.ttl {
                debug!(samples = record.samples, "expiring offender record");
                false
            } else {
                true
            }
        });

        let tolerance = self.match_tolerance;
        let best = self
            .records
            .iter_mut()
            .filter_map(|record| {
                let distance = record.signature.distance(embedding);
                (distance <= tolerance).then_some((record, distance))
            })
            .min_by(|(_, da), (_, db)| da.total_cmp(db));

        if let Some((record, _)) = best {
            record.signature.fold_mean(embedding, record.samples);
            record.samples += 1;
            record.last_alert_at = now;
            return;
        }

        if self.records.len() >= self.max_records {
            if let Some(stalest) = self
                .records
                .iter()
                .enumerate()
                .min_by_key(|(_, record)| record.last_alert_at)
                .map(|(idx, _)| idx)
            {
                let evicted = self.records.swap_remove(stalest);
                debug!(samples = evicted.samples, "evicting stalest offender record");
            }
        }

        self.records.push(OffenderRecord {
            signature: embedding.clone(),
            samples: 1,
            last_alert_at: now,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn is_expired(&self, record: &OffenderRecord, now: Instant) -> bool {
        now.saturating_duration_since(record.last_alert_at) > self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    #[test]
    fn test_lookup_matches_within_tolerance() {
        let mut memory = OffenderMemory::new(Duration::from_secs(3600), 0.6, 16);
        let now = Instant::now();

        memory.upsert(&embedding(&[1.0, 0.0, 0.0]), now);

        assert!(memory
            .lookup(&embedding(&[1.0, 0.1, 0.0]), now)
            .is_some());
        assert!(memory
            .lookup(&embedding(&[0.0, 1.0, 0.0]), now)
            .is_none());
    }

    #[test]
    fn test_expired_record_never_matches() {
        let mut memory = OffenderMemory::new(Duration::from_secs(60), 0.6, 16);
        let t0 = Instant::now();

        memory.upsert(&embedding(&[1.0, 0.0]), t0);

        // Just inside the TTL.
        assert!(memory
            .lookup(&embedding(&[1.0, 0.0]), t0 + Duration::from_secs(60))
            .is_some());
        // Just past it.
        assert!(memory
            .lookup(&embedding(&[1.0, 0.0]), t0 + Duration::from_secs(61))
            .is_none());
    }

    #[test]
    fn test_upsert_sweeps_expired_records() {
        let mut memory = OffenderMemory::new(Duration::from_secs(60), 0.6, 16);
        let t0 = Instant::now();

        memory.upsert(&embedding(&[1.0, 0.0]), t0);
        assert_eq!(memory.len(), 1);

        memory.upsert(&embedding(&[0.0, 1.0]), t0 + Duration::from_secs(120));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_upsert_folds_into_running_mean() {
        let mut memory = OffenderMemory::new(Duration::from_secs(3600), 1.0, 16);
        let t0 = Instant::now();

        memory.upsert(&embedding(&[1.0, 0.0]), t0);
        memory.upsert(&embedding(&[0.6, 0.0]), t0 + Duration::from_secs(1));

        assert_eq!(memory.len(), 1);
        let record = memory
            .lookup(&embedding(&[0.8, 0.0]), t0 + Duration::from_secs(2))
            .unwrap();
        assert_eq!(record.samples(), 2);
        let signature = record.signature().as_slice();
        assert!((signature[0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_distinct_faces_get_distinct_records() {
        let mut memory = OffenderMemory::new(Duration::from_secs(3600), 0.5, 16);
        let now = Instant::now();

        memory.upsert(&embedding(&[1.0, 0.0]), now);
        memory.upsert(&embedding(&[0.0, 1.0]), now);

        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_stalest_record() {
        let mut memory = OffenderMemory::new(Duration::from_secs(3600), 0.3, 2);
        let t0 = Instant::now();

        memory.upsert(&embedding(&[1.0, 0.0, 0.0]), t0);
        memory.upsert(&embedding(&[0.0, 1.0, 0.0]), t0 + Duration::from_secs(1));
        memory.upsert(&embedding(&[0.0, 0.0, 1.0]), t0 + Duration::from_secs(2));

        assert_eq!(memory.len(), 2);
        let now = t0 + Duration::from_secs(3);
        // The oldest signature was evicted to make room.
        assert!(memory.lookup(&embedding(&[1.0, 0.0, 0.0]), now).is_none());
        assert!(memory.lookup(&embedding(&[0.0, 1.0, 0.0]), now).is_some());
        assert!(memory.lookup(&embedding(&[0.0, 0.0, 1.0]), now).is_some());
    }

    #[test]
    fn test_invalid_embedding_is_ignored() {
        let mut memory = OffenderMemory::new(Duration::from_secs(3600), 0.6, 16);
        let now = Instant::now();

        memory.upsert(&embedding(&[f32::NAN, 0.0]), now);
        assert!(memory.is_empty());
        assert!(memory.lookup(&embedding(&[f32::NAN, 0.0]), now).is_none());
    }
}
