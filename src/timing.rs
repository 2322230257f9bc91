use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Incremental mean of every value observed so far
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunningAverage {
    total: f64,
    count: u64,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a value in and return the average including it
    pub fn observe(&mut self, value: f64) -> f64 {
        self.total += value;
        self.count += 1;
        self.total / self.count as f64
    }

    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total / self.count as f64)
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Logs `[label] Starting...` on creation and `[label] Done in X.XXms` when
/// dropped, whichever way the enclosing scope exits.
pub struct ScopedTimer {
    label: String,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        log::info!("[{}] Starting...", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        log::info!("[{}] Done in {:.2}ms", self.label, elapsed_ms);
    }
}
