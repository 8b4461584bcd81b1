//! Bounded frame buffer between capture and processing.
//!
//! Capture must never stall on a slow processing stage, so the producer
//! side never blocks: pushing into a full buffer evicts the oldest
//! unprocessed frame. Built for a single consumer (the processing loop);
//! any number of producers may push.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

/// What happened to a pushed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushResult {
    /// Stored without eviction.
    Stored,
    /// Stored after evicting the oldest unprocessed frame.
    Evicted,
    /// Buffer already closed; the frame was discarded.
    Closed,
}

struct Inner<T> {
    frames: VecDeque<T>,
    closed: bool,
}

/// Bounded drop-oldest buffer.
pub struct FrameBuffer<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
    capacity: usize,
}

impl<T> FrameBuffer<T> {
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                frames: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    /// Offer a frame without ever waiting for the consumer.
    pub async fn push(&self, frame: T) -> PushResult {
        let result = {
            let mut inner = self.inner.lock().await;
            if inner.closed {
                return PushResult::Closed;
            }
            if inner.frames.len() == self.capacity {
                inner.frames.pop_front();
                inner.frames.push_back(frame);
                PushResult::Evicted
            } else {
                inner.frames.push_back(frame);
                PushResult::Stored
            }
        };
        self.notify.notify_one();
        result
    }

    /// Take the oldest frame, waiting for one to arrive.
    ///
    /// Returns `None` once the buffer is closed and fully drained.
    pub async fn pop(&self) -> Option<T> {
        loop {
            // Register for the wakeup before checking, so a push between the
            // check and the await still lands.
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().await;
                if let Some(frame) = inner.frames.pop_front() {
                    return Some(frame);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stop accepting frames. The consumer still drains what is buffered.
    pub async fn close(&self) {
        self.inner.lock().await.closed = true;
        self.notify.notify_waiters();
    }

    /// Frames currently waiting.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.frames.len()
    }
}
