//! Progress counters and cancellation shared with observers

use lumaplan_core::{LumaplanError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Completed/total frame counters of the active render pass.
///
/// Clones share the same counters, so an observer on another thread sees
/// the pass advance.
#[derive(Debug, Clone, Default)]
pub struct RenderProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass expecting `total` frames
    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    /// Count one finished frame, rendered or reused. Returns the new count.
    pub fn advance(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Fraction done in `0.0..=1.0`; an empty pass counts as done.
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        (self.completed() as f64 / total as f64).min(1.0)
    }
}

/// Cooperative interruption flag checked between and during renders
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous cancellation before starting another pass
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// `Err(Interrupted)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(LumaplanError::Interrupted)
        } else {
            Ok(())
        }
    }
}
