//! # Asynchronous write-back pipeline
//!
//! Decouples high-frequency rating changes from the durable store.
//!
//! ```text
//! rating change
//!     ↓  (applied to the ranked store synchronously by the producer)
//! UpdateQueue::enqueue()      bounded, blocks when full
//!     ↓
//! UpdatePipeline workers      private batch per worker
//!     ↓  batch_size reached OR flush timer fired
//! DurableStore::apply_rating_updates()   one transaction per batch
//! ```
//!
//! Event lifecycle: queued -> batched -> flushed, or queued -> batched ->
//! dropped when the transaction fails. Dropped batches are never retried.

pub mod config;
pub mod queue;
pub mod stats;
pub mod types;
pub mod workers;

pub use config::PipelineConfig;
pub use queue::{PipelineError, QueueReceiver, UpdateQueue};
pub use stats::{PipelineStats, PipelineStatsSnapshot};
pub use types::RatingUpdateEvent;
pub use workers::UpdatePipeline;
