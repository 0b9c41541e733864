//! Cooperative shutdown
//!
//! An interrupt only sets a flag. The coordinator checks the flag before
//! every fetch, stops traversing once it is set, and writes its final
//! checkpoint on the way out. An in-flight request or backoff is never
//! preempted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Shared, one-shot cancellation flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown; returns true only for the first request
    pub fn trigger(&self) -> bool {
        !self.requested.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Spawns a task that triggers this signal on the first Ctrl-C
    ///
    /// Register once at process start. Only the first interrupt is acted on;
    /// the run still stops at its next fetch boundary.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        let signal = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    if signal.trigger() {
                        tracing::warn!(
                            "Interrupted! Finishing the current step and saving before exit..."
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
            }
        })
    }
}
