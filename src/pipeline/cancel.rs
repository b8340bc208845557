//! Cancellation and deadlines for a render in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::writer::Checkpoint;

/// Cloneable cancellation token.
///
/// Every clone observes the same flag; cancelling any of them stops the
/// render at its next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once `cancel` was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Checkpoint installed on the canvas of one render.
#[derive(Debug, Clone, Default)]
pub(crate) struct RenderGuard {
    pub(crate) cancel: Option<CancelHandle>,
    pub(crate) deadline: Option<Instant>,
}

impl Checkpoint for RenderGuard {
    fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            return Err(Error::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }
}
