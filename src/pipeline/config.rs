//! Update pipeline configuration

use crate::config::{positive_or, ConfigError};
use std::time::Duration;

/// Configuration for the write-back pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bounded queue size; producers block when it is full
    pub queue_capacity: usize,

    /// Number of flush workers sharing the queue
    pub workers: usize,

    /// Flush as soon as a worker's batch reaches this size
    pub batch_size: usize,

    /// Flush non-empty batches at least this often (milliseconds)
    pub flush_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100_000,
            workers: 8,
            batch_size: 1000,
            flush_interval_ms: 1000,
        }
    }
}

impl PipelineConfig {
    /// Environment variables:
    /// - `UPDATE_QUEUE_CAPACITY` (default: 100000)
    /// - `DB_WORKERS` (default: 8)
    /// - `FLUSH_BATCH_SIZE` (default: 1000)
    /// - `FLUSH_INTERVAL_MS` (default: 1000)
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            queue_capacity: positive_or(lookup, "UPDATE_QUEUE_CAPACITY", defaults.queue_capacity)?,
            workers: positive_or(lookup, "DB_WORKERS", defaults.workers)?,
            batch_size: positive_or(lookup, "FLUSH_BATCH_SIZE", defaults.batch_size)?,
            flush_interval_ms: positive_or(
                lookup,
                "FLUSH_INTERVAL_MS",
                defaults.flush_interval_ms as usize,
            )? as u64,
        })
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}
