//! Processing loop: frames in, alerts out.
//!
//! One task pulls captured frames off the buffer, runs them through the
//! engine pipeline, and offers any resulting alerts to the dispatcher. All
//! engine state mutation happens here, on this single logical thread.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use vigil_dispatch::DispatchHandle;
use vigil_engine::FramePipeline;
use vigil_models::FrameMeta;

use crate::frame_buffer::FrameBuffer;
use crate::metrics;

/// A frame together with its capture metadata, as buffered for processing.
#[derive(Debug)]
pub struct CapturedFrame<F> {
    pub frame: F,
    pub meta: FrameMeta,
}

/// Tracks consecutive detector failures and decides when the run is long
/// enough to surface to an operator.
///
/// Isolated hiccups are normal (the pipeline already downgraded them to
/// empty frames); a sustained run means the camera or model is gone and
/// someone should look at it.
#[derive(Debug)]
pub struct DetectorHealth {
    alarm_run: u32,
    consecutive_failures: u32,
    alarmed: bool,
}

impl DetectorHealth {
    pub fn new(alarm_run: u32) -> Self {
        Self {
            alarm_run: alarm_run.max(1),
            consecutive_failures: 0,
            alarmed: false,
        }
    }

    /// Record one failed detection. Returns true exactly once per run,
    /// when it reaches the alarm length.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        if !self.alarmed && self.consecutive_failures >= self.alarm_run {
            self.alarmed = true;
            return true;
        }
        false
    }

    /// Record a successful detection. Returns true when this ends an
    /// alarmed run, so the recovery can be logged.
    pub fn record_success(&mut self) -> bool {
        let recovered = self.alarmed;
        self.consecutive_failures = 0;
        self.alarmed = false;
        recovered
    }

    pub fn failure_run(&self) -> u32 {
        self.consecutive_failures
    }
}

/// Totals for one runner lifetime, logged at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerReport {
    /// Frames pulled off the buffer.
    pub frames_seen: u64,
    /// Frames the sampler selected for full processing.
    pub frames_processed: u64,
    /// Detector failures observed.
    pub detector_failures: u64,
    /// Alerts the decision stage emitted.
    pub alerts_fired: u64,
    /// Alerts the dispatch queue accepted.
    pub alerts_enqueued: u64,
}

/// Drives the engine pipeline from a frame buffer.
pub struct Runner<F> {
    pipeline: FramePipeline<F>,
    dispatch: DispatchHandle,
    health: DetectorHealth,
}

impl<F> Runner<F> {
    pub fn new(pipeline: FramePipeline<F>, dispatch: DispatchHandle, alarm_run: u32) -> Self {
        Self {
            pipeline,
            dispatch,
            health: DetectorHealth::new(alarm_run),
        }
    }

    /// Pull frames until the buffer closes or shutdown flips to true.
    ///
    /// Frames still buffered when shutdown fires are abandoned; the loop
    /// stops pulling, per the orderly-shutdown contract.
    pub async fn run(
        mut self,
        buffer: Arc<FrameBuffer<CapturedFrame<F>>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> RunnerReport {
        info!("processing loop started");
        let mut report = RunnerReport::default();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("processing loop stopping on shutdown signal");
                        break;
                    }
                }
                captured = buffer.pop() => {
                    let Some(captured) = captured else {
                        info!("frame buffer closed, processing loop draining out");
                        break;
                    };
                    self.step(captured, &mut report);
                }
            }
        }

        info!(
            frames_seen = report.frames_seen,
            frames_processed = report.frames_processed,
            alerts_fired = report.alerts_fired,
            "processing loop stopped"
        );
        report
    }

    fn step(&mut self, captured: CapturedFrame<F>, report: &mut RunnerReport) {
        report.frames_seen += 1;
        let outcome = self.pipeline.process(&captured.frame, captured.meta);
        if !outcome.sampled {
            return;
        }

        report.frames_processed += 1;
        metrics::record_frame_processed(outcome.observations);
        metrics::set_live_tracks(outcome.tracks.len());

        if outcome.detector_failed {
            report.detector_failures += 1;
            metrics::record_detector_failure();
            if self.health.record_failure() {
                error!(
                    run = self.health.failure_run(),
                    "face detector failing repeatedly, check the camera and model"
                );
            }
        } else if self.health.record_success() {
            info!("face detector recovered");
        }

        for alert in outcome.alerts {
            report.alerts_fired += 1;
            metrics::record_alert_fired();
            if self.dispatch.offer(alert) {
                report.alerts_enqueued += 1;
            }
        }
    }
}
