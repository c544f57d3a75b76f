use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Flags shared between the driver callbacks and [`AudioIo`](crate::AudioIo).
#[derive(Clone, Default)]
pub struct StreamStatus {
    input_failed: Arc<AtomicBool>,
    output_failed: Arc<AtomicBool>,
    dropped: Arc<AtomicUsize>,
}

impl StreamStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once either stream has reported an error.
    pub fn has_failed(&self) -> bool {
        self.input_failed() || self.output_failed()
    }

    pub fn input_failed(&self) -> bool {
        self.input_failed.load(Ordering::Relaxed)
    }

    pub fn output_failed(&self) -> bool {
        self.output_failed.load(Ordering::Relaxed)
    }

    pub fn mark_input_failed(&self) {
        self.input_failed.store(true, Ordering::Relaxed);
    }

    pub fn mark_output_failed(&self) {
        self.output_failed.store(true, Ordering::Relaxed);
    }

    /// Captured samples discarded because the capture ring was full.
    pub fn dropped_samples(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn add_dropped(&self, n: usize) {
        if n > 0 {
            self.dropped.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Reads and resets the dropped-sample counter.
    pub fn take_dropped(&self) -> usize {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}
