//! Bounded alert queue and its delivery worker.
//!
//! The frame loop hands alerts in through a non-blocking [`DispatchHandle`];
//! a single worker task drains the queue into an [`AlertSink`] with retries.
//! The queue never exerts backpressure on the frame loop: when it is full
//! the newest event is dropped and counted. Alert pacing is unaffected by
//! drops because the decision side already stamped `last_alert_at` and
//! offender memory before the event got here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vigil_models::AlertEvent;

use crate::metrics;
use crate::retry::{retry_async, RetryConfig, RetryResult};
use crate::sink::AlertSink;

/// Tuning for the dispatch boundary.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Queued alerts held before new ones are dropped.
    pub queue_capacity: usize,
    /// Delivery retries per alert after the initial attempt.
    pub max_retries: u32,
    /// Base backoff delay between delivery attempts.
    pub retry_base_delay: Duration,
    /// How long shutdown waits for queued alerts to drain.
    pub drain_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(250),
            drain_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time dispatch counters, reported at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchStats {
    /// Alerts the sink accepted, retries included.
    pub delivered: u64,
    /// Alerts that exhausted their retry budget.
    pub failed: u64,
    /// Alerts dropped at the queue boundary.
    pub dropped: u64,
}

/// Cloneable, non-blocking submission side of the dispatcher.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<AlertEvent>,
    counters: Arc<Counters>,
}

impl DispatchHandle {
    /// Queue an alert without blocking; returns whether it was accepted.
    ///
    /// A full or closed queue drops the event with a warning. Only this
    /// delivery is lost; in-core alert bookkeeping already advanced.
    pub fn offer(&self, event: AlertEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(alert = %event.id, track = %event.track, "alert queue full, dropping event");
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::record_dropped("queue_full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(alert = %event.id, track = %event.track, "alert queue closed, dropping event");
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::record_dropped("queue_closed");
                false
            }
        }
    }

    /// Current counters.
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }
}

/// Owns the worker task that drains the alert queue into the sink.
pub struct AlertDispatcher {
    handle: DispatchHandle,
    worker: JoinHandle<()>,
    drain_timeout: Duration,
}

impl AlertDispatcher {
    /// Spawn the delivery worker on the current runtime.
    pub fn spawn(sink: Arc<dyn AlertSink>, config: DispatcherConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let counters = Arc::new(Counters::default());
        let drain_timeout = config.drain_timeout;
        let worker = tokio::spawn(deliver_loop(rx, sink, config, Arc::clone(&counters)));

        Self {
            handle: DispatchHandle { tx, counters },
            worker,
            drain_timeout,
        }
    }

    /// A submission handle for the frame loop. Clone freely.
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Current counters.
    pub fn stats(&self) -> DispatchStats {
        self.handle.stats()
    }

    /// Close the queue and let the worker drain it, best effort.
    ///
    /// Every other [`DispatchHandle`] must be dropped first or the worker
    /// keeps waiting for more events until the drain timeout expires.
    pub async fn shutdown(self) -> DispatchStats {
        let Self {
            handle,
            mut worker,
            drain_timeout,
        } = self;
        let counters = Arc::clone(&handle.counters);
        drop(handle);

        if tokio::time::timeout(drain_timeout, &mut worker).await.is_err() {
            warn!(
                timeout_secs = drain_timeout.as_secs(),
                "alert queue did not drain in time, aborting worker"
            );
            worker.abort();
        }

        counters.snapshot()
    }
}

async fn deliver_loop(
    mut rx: mpsc::Receiver<AlertEvent>,
    sink: Arc<dyn AlertSink>,
    config: DispatcherConfig,
    counters: Arc<Counters>,
) {
    info!(sink = sink.name(), "alert dispatch worker started");
    let retry = RetryConfig::new("alert_delivery")
        .with_max_retries(config.max_retries)
        .with_base_delay(config.retry_base_delay);

    while let Some(event) = rx.recv().await {
        let started = Instant::now();
        match retry_async(&retry, || sink.deliver(&event)).await {
            RetryResult::Success(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
                metrics::record_delivered(sink.name(), started.elapsed().as_secs_f64());
                debug!(alert = %event.id, sink = sink.name(), "alert delivered");
            }
            RetryResult::Failed { error, attempts } => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                metrics::record_failed(sink.name());
                error!(
                    alert = %event.id,
                    track = %event.track,
                    attempts,
                    %error,
                    "alert delivery failed permanently"
                );
            }
        }
    }
    info!(sink = sink.name(), "alert dispatch worker stopped");
}
