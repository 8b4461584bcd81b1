//! Security camera agent binary.
//!
//! Wires the synthetic feed, the frame buffer, the engine pipeline, and the
//! alert dispatcher together: capture pushes frames without ever blocking,
//! one processing task pulls them through the engine, and fired alerts are
//! delivered off-thread through the logging sink.

mod config;
mod feed;
mod frame_buffer;
mod metrics;
mod runner;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vigil_dispatch::{AlertDispatcher, LogSink};
use vigil_engine::{FramePipeline, MonotonicClock};

use crate::config::AgentConfig;
use crate::feed::{ScenarioFeed, SyntheticDetector, SyntheticMotion};
use crate::frame_buffer::FrameBuffer;
use crate::runner::Runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vigil=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vigil-agent");

    let config = AgentConfig::from_env();
    config.validate()?;
    info!("Agent config: {:?}", config);

    if let Some(addr) = metrics::init_metrics()? {
        info!(%addr, "Prometheus exporter listening");
    }

    let watchlist = ScenarioFeed::watchlist(config.engine.offender_match_tolerance);
    let pipeline = FramePipeline::new(
        &config.engine,
        Box::new(SyntheticDetector::new(watchlist)),
        Box::new(SyntheticMotion),
        Box::new(MonotonicClock),
    )?;

    let dispatcher = AlertDispatcher::spawn(Arc::new(LogSink), config.dispatch.clone());
    let runner = Runner::new(pipeline, dispatcher.handle(), config.detector_alarm_run);
    let buffer = Arc::new(FrameBuffer::new(config.frame_buffer_capacity));

    // Ctrl-c stops capture; whatever is already queued drains best effort.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    });

    let feed = ScenarioFeed::new(config.feed_fps, config.feed_duration);
    let producer = tokio::spawn(feed.run(Arc::clone(&buffer), shutdown_rx.clone()));

    let report = runner.run(Arc::clone(&buffer), shutdown_rx).await;
    producer.await?;

    // The runner consumed its dispatch handle, so shutdown can drain.
    let stats = dispatcher.shutdown().await;
    info!(
        frames_seen = report.frames_seen,
        frames_processed = report.frames_processed,
        detector_failures = report.detector_failures,
        alerts_fired = report.alerts_fired,
        delivered = stats.delivered,
        failed = stats.failed,
        dropped = stats.dropped,
        "vigil-agent finished"
    );

    Ok(())
}
