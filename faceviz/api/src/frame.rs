//! Scoped frame handles.
//!
//! A driver owns a fixed number of frame buffers. Every frame it hands out
//! carries a [`FrameLease`]; the buffer goes back to the pool when the lease
//! is dropped, whichever way the handler exits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct FramePool {
    name: &'static str,
    capacity: usize,
    outstanding: AtomicUsize,
}

impl FramePool {
    pub fn new(name: &'static str, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            name,
            capacity,
            outstanding: AtomicUsize::new(0),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Borrows a buffer, or `None` when all of them are still held by consumers.
    pub fn try_lease(self: &Arc<Self>) -> Option<FrameLease> {
        self.outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .ok()
            .map(|_| FrameLease { pool: self.clone() })
    }
}

#[derive(Debug)]
pub struct FrameLease {
    pool: Arc<FramePool>,
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        self.pool.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Reference to a frame delivered with a frame-arrived event.
///
/// Acquiring may yield nothing (the frame expired before the consumer got to
/// it); the lease is held either way until the reference is dropped.
#[derive(Debug)]
pub struct FrameReference<T> {
    frame: Option<T>,
    _lease: FrameLease,
}

impl<T> FrameReference<T> {
    pub fn new(frame: Option<T>, lease: FrameLease) -> Self {
        Self {
            frame,
            _lease: lease,
        }
    }

    pub fn acquire_frame(&self) -> Option<&T> {
        self.frame.as_ref()
    }
}
