//! Cooperative cancellation for the crawl loop
//!
//! The signal is set once by an external interrupt (Ctrl-C in the binary) and
//! read by the crawl loop at the top of every page cycle. Setting it never
//! interrupts requests or writes already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag handed to the crawl loop
///
/// Clones share the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSignal {
    /// Creates a signal in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    ///
    /// Returns `true` for the call that actually flipped the flag, `false` if
    /// the signal was already set.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
