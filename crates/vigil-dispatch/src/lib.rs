//! Asynchronous alert dispatch for the vigil pipeline.
//!
//! This crate provides:
//! - The `AlertSink` delivery seam and a logging reference sink
//! - A bounded, non-blocking alert queue with a single delivery worker
//! - Bounded retries with exponential backoff per alert
//! - Delivered/failed/dropped statistics for the shutdown report
//!
//! The frame loop only ever calls [`DispatchHandle::offer`], which never
//! blocks and never fails the caller; everything slow happens on the
//! worker task.

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod sink;

pub use dispatcher::{AlertDispatcher, DispatchHandle, DispatchStats, DispatcherConfig};
pub use error::{DispatchError, DispatchResult};
pub use retry::{retry_async, RetryConfig, RetryResult};
pub use sink::{AlertSink, LogSink};
