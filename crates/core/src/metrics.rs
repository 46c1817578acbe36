use crate::PumpObserver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ThroughputMetrics {
    byte_count: AtomicU64,
    start_time: Instant,
}

impl Default for ThroughputMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ThroughputMetrics {
    pub fn new() -> Self {
        Self {
            byte_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn reset(&self) {
        self.byte_count.store(0, Ordering::SeqCst);
    }

    pub fn bytes_delivered(&self) -> u64 {
        self.byte_count.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Delivered bytes per second since construction.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.bytes_delivered() as f64 / secs
        } else {
            0.0
        }
    }
}

impl PumpObserver for ThroughputMetrics {
    fn on_byte_delivered(&self, _byte: u8) {
        self.byte_count.fetch_add(1, Ordering::SeqCst);
    }
}
