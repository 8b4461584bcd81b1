//! Motion-adaptive frame sampling.
//!
//! Detection is expensive, so only a subset of captured frames is processed.
//! The sampler keeps a modulo gate over the frame index and shrinks the
//! interval while the scene has motion.

use tracing::trace;

/// Decides which captured frames are worth running detection on.
#[derive(Debug)]
pub struct FrameSampler {
    fast_interval: u64,
    slow_interval: u64,
    current_interval: u64,
}

impl FrameSampler {
    /// Intervals are clamped to at least 1 so the gate can never stall.
    pub fn new(fast_interval_frames: u32, slow_interval_frames: u32) -> Self {
        let fast = u64::from(fast_interval_frames.max(1));
        let slow = u64::from(slow_interval_frames.max(1));
        Self {
            fast_interval: fast,
            slow_interval: slow,
            current_interval: slow,
        }
    }

    /// Returns true when `frame_index` should go through detection.
    ///
    /// The motion flag takes effect on this very frame, so a burst of motion
    /// immediately tightens the gate instead of waiting a full slow interval.
    pub fn should_process(&mut self, frame_index: u64, motion_detected: bool) -> bool {
        let interval = if motion_detected {
            self.fast_interval
        } else {
            self.slow_interval
        };
        if interval != self.current_interval {
            trace!(
                from = self.current_interval,
                to = interval,
                motion = motion_detected,
                "sampling interval switched"
            );
            self.current_interval = interval;
        }
        frame_index % self.current_interval == 0
    }

    pub fn current_interval(&self) -> u64 {
        self.current_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_zero_is_always_processed() {
        let mut sampler = FrameSampler::new(20, 40);
        assert!(sampler.should_process(0, false));
        assert!(sampler.should_process(0, true));
    }

    #[test]
    fn test_slow_interval_without_motion() {
        let mut sampler = FrameSampler::new(2, 4);
        let processed: Vec<u64> = (0..12)
            .filter(|&i| sampler.should_process(i, false))
            .collect();
        assert_eq!(processed, vec![0, 4, 8]);
    }

    #[test]
    fn test_motion_shrinks_interval() {
        let mut sampler = FrameSampler::new(2, 4);
        let processed: Vec<u64> = (0..8)
            .filter(|&i| sampler.should_process(i, true))
            .collect();
        assert_eq!(processed, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_switch_applies_on_current_frame() {
        let mut sampler = FrameSampler::new(2, 40);
        // Frame 6 misses the slow gate but motion switches to the fast
        // interval right away, and 6 % 2 == 0.
        assert!(!sampler.should_process(6, false));
        assert_eq!(sampler.current_interval(), 40);
        assert!(sampler.should_process(6, true));
        assert_eq!(sampler.current_interval(), 2);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let mut sampler = FrameSampler::new(0, 0);
        for i in 0..5 {
            assert!(sampler.should_process(i, i % 2 == 0));
        }
    }
}
