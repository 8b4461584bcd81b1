//! Engine tuning knobs.
//!
//! Defaults are calibrated for a home-entry camera running at single-digit
//! frames per second. All durations are measured on the monotonic clock.

use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Configuration for the frame pipeline and its stages.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long an unknown face must stay unauthorized before the first alert.
    pub first_time_threshold: Duration,
    /// Shortened threshold applied when the face matches offender memory.
    pub repeat_offender_threshold: Duration,
    /// Minimum spacing between consecutive alerts for the same track.
    pub alert_cooldown: Duration,

    /// Maximum center distance (pixels) for an observation to match a track.
    pub match_distance_threshold: f64,
    /// Processed frames a track may go unmatched before it is pruned.
    pub prune_grace_frames: u32,

    /// How long an offender signature stays eligible for matching.
    pub offender_ttl: Duration,
    /// Maximum embedding distance for an offender-memory match.
    pub offender_match_tolerance: f64,
    /// Upper bound on retained offender records.
    pub offender_max_records: usize,

    /// Sampling interval (frames) while motion is present.
    pub fast_interval_frames: u32,
    /// Sampling interval (frames) while the scene is still.
    pub slow_interval_frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            first_time_threshold: Duration::from_secs(5),
            repeat_offender_threshold: Duration::from_secs(1),
            alert_cooldown: Duration::from_secs(30),
            match_distance_threshold: 100.0,
            prune_grace_frames: 10,
            offender_ttl: Duration::from_secs(3600),
            offender_match_tolerance: 0.6,
            offender_max_records: 128,
            fast_interval_frames: 20,
            slow_interval_frames: 40,
        }
    }
}

impl EngineConfig {
    /// Rejects configurations that would make the pipeline misbehave.
    pub fn validate(&self) -> EngineResult<()> {
        if self.repeat_offender_threshold > self.first_time_threshold {
            return Err(EngineError::invalid_config(format!(
                "repeat_offender_threshold ({:?}) must not exceed first_time_threshold ({:?})",
                self.repeat_offender_threshold, self.first_time_threshold
            )));
        }
        if self.fast_interval_frames == 0 || self.slow_interval_frames == 0 {
            return Err(EngineError::invalid_config(
                "sampling intervals must be at least 1 frame",
            ));
        }
        if self.fast_interval_frames > self.slow_interval_frames {
            return Err(EngineError::invalid_config(format!(
                "fast_interval_frames ({}) must not exceed slow_interval_frames ({})",
                self.fast_interval_frames, self.slow_interval_frames
            )));
        }
        if !self.match_distance_threshold.is_finite() || self.match_distance_threshold <= 0.0 {
            return Err(EngineError::invalid_config(
                "match_distance_threshold must be a positive finite number",
            ));
        }
        if !self.offender_match_tolerance.is_finite() || self.offender_match_tolerance <= 0.0 {
            return Err(EngineError::invalid_config(
                "offender_match_tolerance must be a positive finite number",
            ));
        }
        if self.offender_max_records == 0 {
            return Err(EngineError::invalid_config(
                "offender_max_records must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_repeat_threshold_above_first() {
        let config = EngineConfig {
            first_time_threshold: Duration::from_secs(1),
            repeat_offender_threshold: Duration::from_secs(5),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_sampling_interval() {
        let config = EngineConfig {
            fast_interval_frames: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_fast_interval_above_slow() {
        let config = EngineConfig {
            fast_interval_frames: 50,
            slow_interval_frames: 40,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_match_distance() {
        let config = EngineConfig {
            match_distance_threshold: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            match_distance_threshold: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_offender_capacity() {
        let config = EngineConfig {
            offender_max_records: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
