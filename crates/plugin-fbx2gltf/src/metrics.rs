//! Conversion metrics.
//!
//! Counts conversions and keeps recent durations so each run can log a
//! summary. Counters are atomics; duration samples sit behind a mutex.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum number of duration samples to keep in memory.
const MAX_DURATION_SAMPLES: usize = 1000;

/// Conversion metrics collector, shared by all workers of a processor.
#[derive(Debug)]
pub struct ConversionMetrics {
    /// Conversions started.
    pub conversions_started: AtomicU64,
    /// Conversions completed successfully.
    pub conversions_succeeded: AtomicU64,
    /// Conversions that failed.
    pub conversions_failed: AtomicU64,
    /// Bytes of glTF output produced.
    pub total_output_bytes: AtomicU64,
    duration_samples: Mutex<Vec<Duration>>,
}

impl ConversionMetrics {
    /// Create a new empty metrics collector.
    pub fn new() -> Self {
        Self {
            conversions_started: AtomicU64::new(0),
            conversions_succeeded: AtomicU64::new(0),
            conversions_failed: AtomicU64::new(0),
            total_output_bytes: AtomicU64::new(0),
            duration_samples: Mutex::new(Vec::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record a conversion start.
    pub fn record_started(&self) {
        self.conversions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful conversion with its duration and output size.
    pub fn record_success(&self, duration: Duration, output_bytes: u64) {
        self.conversions_succeeded.fetch_add(1, Ordering::Relaxed);
        self.total_output_bytes
            .fetch_add(output_bytes, Ordering::Relaxed);
        self.add_duration_sample(duration);
    }

    /// Record a failed conversion.
    pub fn record_failure(&self, duration: Duration) {
        self.conversions_failed.fetch_add(1, Ordering::Relaxed);
        self.add_duration_sample(duration);
    }

    fn add_duration_sample(&self, duration: Duration) {
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.remove(0);
            }
            samples.push(duration);
        }
    }

    /// Current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut durations = self
            .duration_samples
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        durations.sort();

        let len = durations.len();
        let percentile = |p: usize| durations.get(len * p / 100).map(|d| d.as_millis() as u64);

        MetricsSnapshot {
            conversions_started: self.conversions_started.load(Ordering::Relaxed),
            conversions_succeeded: self.conversions_succeeded.load(Ordering::Relaxed),
            conversions_failed: self.conversions_failed.load(Ordering::Relaxed),
            total_output_bytes: self.total_output_bytes.load(Ordering::Relaxed),
            duration_p50_ms: percentile(50),
            duration_p95_ms: percentile(95),
            duration_max_ms: durations.last().map(|d| d.as_millis() as u64),
        }
    }
}

impl Default for ConversionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of conversion metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Conversions started.
    pub conversions_started: u64,
    /// Successful conversions.
    pub conversions_succeeded: u64,
    /// Failed conversions.
    pub conversions_failed: u64,
    /// Output bytes produced.
    pub total_output_bytes: u64,
    /// Median conversion duration.
    pub duration_p50_ms: Option<u64>,
    /// 95th percentile conversion duration.
    pub duration_p95_ms: Option<u64>,
    /// Slowest conversion.
    pub duration_max_ms: Option<u64>,
}
