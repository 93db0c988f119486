//! Shutdown coordination between the signal listener and the tick loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared shutdown state for stopping the tick loop cleanly.
#[derive(Debug, Clone)]
pub struct ShutdownState {
    /// Set once a stop has been requested; no further ticks are started
    shutdown_initiated: Arc<AtomicBool>,
    /// Set after the grid has been disposed and final statistics reported
    shutdown_complete: Arc<AtomicBool>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self {
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
            shutdown_complete: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true if a stop has been requested.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::Acquire)
    }

    /// Returns true once cleanup has finished.
    pub fn is_shutdown_complete(&self) -> bool {
        self.shutdown_complete.load(Ordering::Acquire)
    }

    /// Requests a stop. The tick in progress, if any, still completes.
    pub fn initiate_shutdown(&self) {
        if !self.shutdown_initiated.swap(true, Ordering::AcqRel) {
            info!("🛑 Shutdown initiated - no new ticks will be started");
        }
    }

    /// Marks cleanup as finished.
    pub fn complete_shutdown(&self) {
        self.shutdown_complete.store(true, Ordering::Release);
        info!("✅ Grid released - shutdown complete");
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}
