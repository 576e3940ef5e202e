//! Synthetic rating churn
//!
//! Picks random existing members, gives them a random rating, applies it to
//! the ranked store right away and queues the durable write-back.

use crate::deadline::Deadline;
use crate::error::LeaderboardError;
use crate::pipeline::{RatingUpdateEvent, UpdateQueue};
use crate::ranking::RankedStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_SIMULATION_UPDATES: usize = 500;
/// Simulated ratings are drawn from `[0, MAX_SIMULATED_RATING)`
pub const MAX_SIMULATED_RATING: i64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub requested: usize,
    pub updates: usize,
}

pub struct LoadSimulator {
    ranked: Arc<dyn RankedStore>,
    queue: UpdateQueue,
}

impl LoadSimulator {
    pub fn new(ranked: Arc<dyn RankedStore>, queue: UpdateQueue) -> Self {
        Self { ranked, queue }
    }

    pub async fn simulate(
        &self,
        updates: usize,
        deadline: Deadline,
    ) -> Result<SimulationReport, LeaderboardError> {
        let mut rng = StdRng::from_entropy();
        self.simulate_with_rng(updates, &mut rng, deadline).await
    }

    /// Same as `simulate` with a caller-supplied random source
    pub async fn simulate_with_rng<R: Rng + Send>(
        &self,
        updates: usize,
        rng: &mut R,
        deadline: Deadline,
    ) -> Result<SimulationReport, LeaderboardError> {
        let size = self.ranked.size().await? as u64;
        if size == 0 {
            return Err(LeaderboardError::EmptyLeaderboard);
        }

        let mut applied = 0;
        for _ in 0..updates {
            if deadline.is_expired() {
                log::warn!("⚠️  Simulation cancelled after {}/{} updates", applied, updates);
                return Err(LeaderboardError::Timeout);
            }

            let position = rng.gen_range(1..=size);
            let Some(member) = self.ranked.sample_at_rank(position).await? else {
                // Store shrank since it was sized
                continue;
            };
            let rating = rng.gen_range(0..MAX_SIMULATED_RATING);

            self.ranked.upsert(&member.username, rating).await?;
            self.queue
                .enqueue(RatingUpdateEvent::new(member.username, rating), deadline)
                .await?;
            applied += 1;
        }

        log::info!(
            "🎲 Simulated {} rating updates (queue depth {}/{})",
            applied,
            self.queue.depth(),
            self.queue.capacity()
        );
        Ok(SimulationReport {
            requested: updates,
            updates: applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineError, QueueReceiver};
    use crate::ranking::InMemoryRankedStore;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn fixture(
        members: usize,
        capacity: usize,
    ) -> (LoadSimulator, Arc<InMemoryRankedStore>, QueueReceiver) {
        let store = Arc::new(InMemoryRankedStore::new());
        for i in 0..members {
            store.upsert(&format!("user{}", i), i as i64).await.unwrap();
        }
        let (queue, receiver) = UpdateQueue::bounded(capacity);
        (LoadSimulator::new(store.clone(), queue), store, receiver)
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_updates_store_and_enqueues_each_event() {
        let (simulator, store, receiver) = fixture(5, 100).await;
        let mut rng = StdRng::seed_from_u64(7);

        let report = simulator
            .simulate_with_rng(10, &mut rng, deadline())
            .await
            .unwrap();
        assert_eq!(report, SimulationReport { requested: 10, updates: 10 });

        let mut rx = receiver.into_inner();
        let mut latest = HashMap::new();
        for _ in 0..10 {
            let event = rx.try_recv().unwrap();
            assert!((0..MAX_SIMULATED_RATING).contains(&event.rating));
            latest.insert(event.username, event.rating);
        }
        assert!(rx.try_recv().is_err());

        // Ranked store reflects the last event written per member
        for (username, rating) in latest {
            assert_eq!(store.score(&username).await.unwrap(), Some(rating));
        }
        assert_eq!(store.size().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let (first, _, first_rx) = fixture(20, 100).await;
        let (second, _, second_rx) = fixture(20, 100).await;

        first
            .simulate_with_rng(15, &mut StdRng::seed_from_u64(42), deadline())
            .await
            .unwrap();
        second
            .simulate_with_rng(15, &mut StdRng::seed_from_u64(42), deadline())
            .await
            .unwrap();

        let (mut a, mut b) = (first_rx.into_inner(), second_rx.into_inner());
        for _ in 0..15 {
            assert_eq!(a.try_recv().unwrap(), b.try_recv().unwrap());
        }
    }

    #[tokio::test]
    async fn test_empty_leaderboard_fails_fast() {
        let (simulator, _, receiver) = fixture(0, 10).await;

        let result = simulator.simulate(10, deadline()).await;
        assert!(matches!(result, Err(LeaderboardError::EmptyLeaderboard)));
        assert!(receiver.into_inner().try_recv().is_err());
    }

    #[tokio::test]
    async fn test_zero_updates() {
        let (simulator, _, _receiver) = fixture(3, 10).await;
        let report = simulator.simulate(0, deadline()).await.unwrap();
        assert_eq!(report.updates, 0);
    }

    #[tokio::test]
    async fn test_full_queue_times_out() {
        let (simulator, _, _receiver) = fixture(3, 2).await;

        let result = simulator
            .simulate(5, Deadline::after(Duration::from_millis(50)))
            .await;
        assert!(matches!(
            result,
            Err(LeaderboardError::Pipeline(PipelineError::EnqueueTimeout))
        ));
    }
}
