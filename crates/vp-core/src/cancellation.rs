//! Cooperative cancellation for long-running solvers.
//!
//! Monte Carlo runs and fine-grid PDE solves can take long enough that a
//! caller may want to abandon them.  Cancellation is cooperative: the solver
//! polls the token between path batches / time layers and returns
//! [`Error::Cancelled`](crate::Error::Cancelled) instead of a partial result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag shared between a caller and a solver.
///
/// Cloning is cheap (an `Arc` bump); all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
