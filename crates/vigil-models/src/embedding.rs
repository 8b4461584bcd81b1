//! Face embedding vectors.

use serde::{Deserialize, Serialize};

/// A face embedding produced by the recognition model.
///
/// The same Euclidean metric is used everywhere an embedding is compared:
/// the authorized watchlist, track-match tie-breaking, and offender memory
/// lookups all operate in the recognition model's metric space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wrap a raw embedding vector.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw component access.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean distance to another embedding.
    ///
    /// Embeddings of mismatched dimensionality come from different models
    /// and can never represent the same identity; the distance is reported
    /// as infinite so they fail every tolerance check.
    pub fn distance(&self, other: &Embedding) -> f64 {
        if self.0.len() != other.0.len() || self.0.is_empty() {
            return f64::INFINITY;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = (*a - *b) as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Whether the embedding is usable: non-empty and all components finite.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|v| v.is_finite())
    }

    /// Fold another embedding into this one as a running mean over
    /// `samples` prior observations. Used to maintain centroid signatures.
    pub fn fold_mean(&mut self, other: &Embedding, samples: u32) {
        if self.0.len() != other.0.len() {
            return;
        }
        let n = samples.max(1) as f32;
        for (acc, v) in self.0.iter_mut().zip(other.0.iter()) {
            *acc = (*acc * n + *v) / (n + 1.0);
        }
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_distance_dimension_mismatch_is_infinite() {
        let a = Embedding::new(vec![1.0, 2.0, 3.0]);
        let b = Embedding::new(vec![1.0, 2.0]);
        assert_eq!(a.distance(&b), f64::INFINITY);
    }

    #[test]
    fn test_validity() {
        assert!(Embedding::new(vec![0.1, -0.4]).is_valid());
        assert!(!Embedding::new(vec![]).is_valid());
        assert!(!Embedding::new(vec![0.1, f32::NAN]).is_valid());
    }

    #[test]
    fn test_fold_mean() {
        let mut centroid = Embedding::new(vec![1.0, 3.0]);
        centroid.fold_mean(&Embedding::new(vec![3.0, 5.0]), 1);
        assert_eq!(centroid.as_slice(), &[2.0, 4.0]);

        // Third sample weighted against the two already folded in.
        centroid.fold_mean(&Embedding::new(vec![8.0, 10.0]), 2);
        assert_eq!(centroid.as_slice(), &[4.0, 6.0]);
    }
}
