use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by all pipeline workers
#[derive(Debug, Default)]
pub struct PipelineStats {
    received: AtomicU64,
    flushed: AtomicU64,
    dropped: AtomicU64,
    batches_flushed: AtomicU64,
    batches_failed: AtomicU64,
}

/// Point-in-time copy of `PipelineStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStatsSnapshot {
    pub received: u64,
    pub flushed: u64,
    pub dropped: u64,
    pub batches_flushed: u64,
    pub batches_failed: u64,
}

impl PipelineStats {
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flushed(&self, events: usize) {
        self.flushed.fetch_add(events as u64, Ordering::Relaxed);
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, events: usize) {
        self.dropped.fetch_add(events as u64, Ordering::Relaxed);
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            flushed: self.flushed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
        }
    }
}

impl PipelineStatsSnapshot {
    /// Events received but neither flushed nor dropped yet
    pub fn in_flight(&self) -> u64 {
        self.received.saturating_sub(self.flushed + self.dropped)
    }
}
