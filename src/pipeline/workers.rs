//! Write-back worker pool
//!
//! Each worker owns a private batch and loops over:
//! 1. Dequeue one event from the shared queue into its batch
//! 2. Flush when the batch reaches `batch_size`
//! 3. Flush a non-empty batch whenever the flush timer fires
//!
//! A flush is one durable transaction. If it fails the batch is logged,
//! counted and discarded: delivery to the durable store is at-most-once.
//! The ranked store already holds the new ratings, so reads are unaffected.
//!
//! On shutdown workers drain whatever is immediately queued, do a final
//! flush and exit.

use super::config::PipelineConfig;
use super::queue::QueueReceiver;
use super::stats::{PipelineStats, PipelineStatsSnapshot};
use super::types::RatingUpdateEvent;
use crate::db::DurableStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

type SharedReceiver = Arc<Mutex<mpsc::Receiver<RatingUpdateEvent>>>;

/// Running worker pool draining an `UpdateQueue` into a `DurableStore`
pub struct UpdatePipeline {
    workers: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
    stats: Arc<PipelineStats>,
}

struct Worker {
    id: usize,
    rx: SharedReceiver,
    durable: Arc<dyn DurableStore>,
    batch: Vec<RatingUpdateEvent>,
    batch_size: usize,
    flush_interval: Duration,
    stats: Arc<PipelineStats>,
    shutdown: CancellationToken,
}

impl UpdatePipeline {
    /// Spawn `config.workers` flush workers on the current runtime
    pub fn start(
        receiver: QueueReceiver,
        durable: Arc<dyn DurableStore>,
        config: &PipelineConfig,
    ) -> Self {
        let rx: SharedReceiver = Arc::new(Mutex::new(receiver.into_inner()));
        let shutdown = CancellationToken::new();
        let stats = Arc::new(PipelineStats::default());
        let batch_size = config.batch_size.max(1);

        log::info!("🚀 Starting update pipeline");
        log::info!("   ├─ Workers: {}", config.workers);
        log::info!("   ├─ Batch size: {}", batch_size);
        log::info!("   └─ Flush interval: {}ms", config.flush_interval_ms);

        let workers = (0..config.workers.max(1))
            .map(|id| {
                let worker = Worker {
                    id,
                    rx: Arc::clone(&rx),
                    durable: Arc::clone(&durable),
                    batch: Vec::with_capacity(batch_size),
                    batch_size,
                    flush_interval: config.flush_interval().max(Duration::from_millis(1)),
                    stats: Arc::clone(&stats),
                    shutdown: shutdown.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        Self {
            workers,
            shutdown,
            stats,
        }
    }

    pub fn stats(&self) -> PipelineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Signal every worker to stop and wait for their final flushes
    pub async fn shutdown(self) -> PipelineStatsSnapshot {
        log::info!("🔄 Stopping update pipeline...");
        self.shutdown.cancel();

        for handle in self.workers {
            if let Err(e) = handle.await {
                log::error!("❌ Pipeline worker panicked: {}", e);
            }
        }

        let stats = self.stats.snapshot();
        log::info!(
            "✅ Update pipeline stopped: {} received, {} flushed, {} dropped ({} batches failed)",
            stats.received,
            stats.flushed,
            stats.dropped,
            stats.batches_failed
        );
        stats
    }
}

impl Worker {
    async fn run(mut self) {
        let mut flush_timer = interval(self.flush_interval);
        flush_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::debug!("Worker {} started", self.id);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    self.drain_available().await;
                    break;
                }

                received = next_event(&self.rx) => match received {
                    Some(event) => {
                        self.stats.record_received();
                        self.batch.push(event);
                        if self.batch.len() >= self.batch_size {
                            self.flush().await;
                        }
                    }
                    // Every producer handle is gone
                    None => break,
                },

                _ = flush_timer.tick() => {
                    if !self.batch.is_empty() {
                        self.flush().await;
                    }
                }
            }
        }

        if !self.batch.is_empty() {
            self.flush().await;
        }
        log::debug!("Worker {} stopped", self.id);
    }

    /// Pull everything already queued without waiting for more
    async fn drain_available(&mut self) {
        loop {
            let next = self.rx.lock().await.try_recv().ok();
            let Some(event) = next else { break };

            self.stats.record_received();
            self.batch.push(event);
            if self.batch.len() >= self.batch_size {
                self.flush().await;
            }
        }
    }

    async fn flush(&mut self) {
        let events = std::mem::replace(&mut self.batch, Vec::with_capacity(self.batch_size));
        let size = events.len();
        let started = Instant::now();

        match self.durable.apply_rating_updates(events).await {
            Ok(rows) => {
                self.stats.record_flushed(size);
                log::debug!(
                    "✅ Worker {} flushed {} rating updates ({} rows) in {}ms",
                    self.id,
                    size,
                    rows,
                    started.elapsed().as_millis()
                );
            }
            Err(e) => {
                self.stats.record_dropped(size);
                log::error!(
                    "❌ Worker {} dropped batch of {} rating updates: {}",
                    self.id,
                    size,
                    e
                );
            }
        }
    }
}

async fn next_event(rx: &SharedReceiver) -> Option<RatingUpdateEvent> {
    rx.lock().await.recv().await
}
