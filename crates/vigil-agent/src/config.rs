//! Agent configuration from environment variables.

use std::time::Duration;

use vigil_dispatch::DispatcherConfig;
use vigil_engine::EngineConfig;

/// Top-level configuration for the agent binary.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Engine tuning passed through to the frame pipeline.
    pub engine: EngineConfig,
    /// Captured frames the buffer holds before the oldest is dropped.
    pub frame_buffer_capacity: usize,
    /// Alert queue and delivery retry tuning.
    pub dispatch: DispatcherConfig,
    /// Consecutive detector failures before the operator-facing alarm.
    pub detector_alarm_run: u32,
    /// Frames per second the synthetic feed emits.
    pub feed_fps: u32,
    /// How long the synthetic feed runs before the agent exits on its own.
    pub feed_duration: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            frame_buffer_capacity: 8,
            dispatch: DispatcherConfig::default(),
            detector_alarm_run: 10,
            feed_fps: 10,
            feed_duration: Duration::from_secs(60),
        }
    }
}

impl AgentConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            engine: EngineConfig {
                first_time_threshold: Duration::from_secs(
                    std::env::var("VIGIL_FIRST_TIME_THRESHOLD_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(5),
                ),
                repeat_offender_threshold: Duration::from_secs(
                    std::env::var("VIGIL_REPEAT_OFFENDER_THRESHOLD_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(1),
                ),
                alert_cooldown: Duration::from_secs(
                    std::env::var("VIGIL_ALERT_COOLDOWN_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(30),
                ),
                match_distance_threshold: std::env::var("VIGIL_MATCH_DISTANCE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100.0),
                prune_grace_frames: std::env::var("VIGIL_PRUNE_GRACE_FRAMES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                offender_ttl: Duration::from_secs(
                    std::env::var("VIGIL_OFFENDER_TTL_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(3600),
                ),
                offender_match_tolerance: std::env::var("VIGIL_OFFENDER_TOLERANCE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.6),
                offender_max_records: std::env::var("VIGIL_OFFENDER_MAX_RECORDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(128),
                fast_interval_frames: std::env::var("VIGIL_FAST_INTERVAL_FRAMES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
                slow_interval_frames: std::env::var("VIGIL_SLOW_INTERVAL_FRAMES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(40),
            },
            frame_buffer_capacity: std::env::var("VIGIL_FRAME_BUFFER_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            dispatch: DispatcherConfig {
                queue_capacity: std::env::var("VIGIL_DISPATCH_QUEUE_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(32),
                max_retries: std::env::var("VIGIL_DISPATCH_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                retry_base_delay: Duration::from_millis(
                    std::env::var("VIGIL_DISPATCH_RETRY_BASE_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(250),
                ),
                drain_timeout: Duration::from_secs(
                    std::env::var("VIGIL_DRAIN_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(10),
                ),
            },
            detector_alarm_run: std::env::var("VIGIL_DETECTOR_ALARM_RUN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            feed_fps: std::env::var("VIGIL_FEED_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            feed_duration: Duration::from_secs(
                std::env::var("VIGIL_FEED_DURATION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }

    /// Rejects configurations the agent cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.engine.validate()?;
        if self.frame_buffer_capacity == 0 {
            anyhow::bail!("VIGIL_FRAME_BUFFER_CAPACITY must be at least 1");
        }
        if self.dispatch.queue_capacity == 0 {
            anyhow::bail!("VIGIL_DISPATCH_QUEUE_CAPACITY must be at least 1");
        }
        if self.detector_alarm_run == 0 {
            anyhow::bail!("VIGIL_DETECTOR_ALARM_RUN must be at least 1");
        }
        if self.feed_fps == 0 || self.feed_fps > 1000 {
            anyhow::bail!("VIGIL_FEED_FPS must be between 1 and 1000");
        }
        Ok(())
    }
}
