use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::media::MediaEntry;

/// Flush thresholds for the batch accumulator.
///
/// The defaults balance first-batch latency against update-rate overhead for
/// a UI list; they are tunable configuration, not load-bearing constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Flush once the buffer holds this many entries.
    pub flush_count: usize,
    /// Hold count-triggered flushes until this long after the previous
    /// flush, so fast thumbnail generation does not flood the consumer.
    pub min_flush_interval: Duration,
    /// Flush whatever is buffered once this long has passed since the
    /// previous flush, even below the count threshold.
    pub max_flush_interval: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            flush_count: 100,
            min_flush_interval: Duration::from_millis(500),
            max_flush_interval: Duration::from_secs(1),
        }
    }
}

/// Buffers scanned entries and decides when a batch is handed to the consumer.
///
/// A batch is released when the count threshold is met and the minimum
/// interval since the previous flush has passed (vacuously true before the
/// first flush), or unconditionally once the maximum interval has elapsed.
pub(super) struct BatchAccumulator {
    config: BatchConfig,
    buffer: Vec<MediaEntry>,
    started: Instant,
    last_flush: Option<Instant>,
}

impl BatchAccumulator {
    pub(super) fn new(config: BatchConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            started: Instant::now(),
            last_flush: None,
        }
    }

    /// Buffer `entry`, returning a non-empty batch when the flush policy fires.
    pub(super) fn offer(&mut self, entry: MediaEntry) -> Option<Vec<MediaEntry>> {
        self.buffer.push(entry);

        let elapsed = self.last_flush.unwrap_or(self.started).elapsed();
        let guard_open = self.last_flush.is_none() || elapsed > self.config.min_flush_interval;
        let count_due = self.buffer.len() >= self.config.flush_count && guard_open;
        let overdue = elapsed > self.config.max_flush_interval;

        (count_due || overdue).then(|| self.flush())
    }

    /// Hand back whatever remains as the terminal batch, ignoring thresholds.
    pub(super) fn take_remainder(&mut self) -> Option<Vec<MediaEntry>> {
        (!self.buffer.is_empty()).then(|| self.flush())
    }

    /// Drop the undelivered tail after a cancellation.
    pub(super) fn discard(&mut self) {
        self.buffer.clear();
    }

    fn flush(&mut self) -> Vec<MediaEntry> {
        self.last_flush = Some(Instant::now());
        std::mem::take(&mut self.buffer)
    }
}
