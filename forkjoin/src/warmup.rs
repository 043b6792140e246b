//! First-request detection for a freshly started instance.
//!
//! A cold instance must not serve fork/join traffic: the very first request
//! of the process is bounced back to the same URI so the platform absorbs the
//! start-up cost before real work arrives.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct WarmupGate {
    cold: AtomicBool,
}

impl WarmupGate {
    /// Gate for a process that has not served anything yet.
    pub fn cold() -> Self {
        Self {
            cold: AtomicBool::new(true),
        }
    }

    /// Gate that lets every request through.
    pub fn warm() -> Self {
        Self {
            cold: AtomicBool::new(false),
        }
    }

    pub fn is_cold(&self) -> bool {
        self.cold.load(Ordering::SeqCst)
    }

    /// True exactly once for a cold gate: the caller owns the warm-up request.
    pub fn take_cold(&self) -> bool {
        self.cold.swap(false, Ordering::SeqCst)
    }
}

impl Default for WarmupGate {
    fn default() -> Self {
        Self::cold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn cold_gate_fires_once() {
        let gate = WarmupGate::cold();
        assert!(gate.is_cold());
        assert!(gate.take_cold());
        assert!(!gate.is_cold());
        assert!(!gate.take_cold());
    }

    #[test]
    fn warm_gate_never_fires() {
        let gate = WarmupGate::warm();
        assert!(!gate.take_cold());
    }

    #[test]
    fn concurrent_requests_see_one_warmup() {
        let gate = Arc::new(WarmupGate::cold());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.take_cold())
            })
            .collect();

        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&fired| fired)
            .count();
        assert_eq!(fired, 1);
    }
}
