//! Cooperative cancellation shared between a search and its controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Nodes searched between two stop-flag polls.
pub const NODE_POLL_INTERVAL: u64 = 2048;

/// Cloneable stop flag. A search polls it; any clone may raise it.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::StopSignal;

    #[test]
    fn clones_share_one_flag() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        assert!(!signal.should_stop());

        remote.request_stop();
        assert!(signal.should_stop());

        signal.reset();
        assert!(!remote.should_stop());
    }
}
