//! Bounded update queue
//!
//! The only flow-control point in the system: when the worker pool can't
//! keep up with the durable store, producers wait here instead of growing
//! memory. A producer waiting past its request deadline gets an error.

use super::types::RatingUpdateEvent;
use crate::deadline::Deadline;
use tokio::sync::mpsc;
use tokio::time::timeout_at;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("timed out waiting for space in the update queue")]
    EnqueueTimeout,
    #[error("update pipeline is shut down")]
    Closed,
}

/// Producer handle. Cheap to clone; all clones feed the same queue.
#[derive(Debug, Clone)]
pub struct UpdateQueue {
    tx: mpsc::Sender<RatingUpdateEvent>,
    capacity: usize,
}

/// Consumer end, handed to `UpdatePipeline::start`
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<RatingUpdateEvent>,
}

impl QueueReceiver {
    pub(crate) fn into_inner(self) -> mpsc::Receiver<RatingUpdateEvent> {
        self.rx
    }
}

impl UpdateQueue {
    /// Create a queue holding at most `capacity` events (minimum 1)
    pub fn bounded(capacity: usize) -> (Self, QueueReceiver) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, capacity }, QueueReceiver { rx })
    }

    /// Enqueue an event, waiting while the queue is full
    ///
    /// Fails with `EnqueueTimeout` if no slot frees up before `deadline`,
    /// and with `Closed` once the pipeline has shut down.
    pub async fn enqueue(
        &self,
        event: RatingUpdateEvent,
        deadline: Deadline,
    ) -> Result<(), PipelineError> {
        match timeout_at(deadline.instant(), self.tx.send(event)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(PipelineError::Closed),
            Err(_) => {
                log::warn!(
                    "⚠️  Update queue full ({}/{}), enqueue timed out",
                    self.depth(),
                    self.capacity
                );
                Err(PipelineError::EnqueueTimeout)
            }
        }
    }

    /// Events currently waiting in the queue
    pub fn depth(&self) -> usize {
        self.capacity.saturating_sub(self.tx.capacity())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
