//! Bulk load of durable users into the ranked store and prefix index
//!
//! Pages through `leadboard` by `user_id` cursor. Each page is applied
//! before the next is fetched; a failure part-way leaves earlier pages
//! applied. Re-running over the same data converges to the same state
//! because every write is an upsert.

use crate::db::DurableStore;
use crate::deadline::Deadline;
use crate::error::LeaderboardError;
use crate::ranking::{PrefixIndex, RankedStore};
use std::sync::Arc;
use tokio::time::timeout_at;

pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Outcome of a completed bootstrap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub pages: usize,
    pub members: usize,
    pub last_user_id: i64,
}

pub struct BootstrapLoader {
    durable: Arc<dyn DurableStore>,
    ranked: Arc<dyn RankedStore>,
    prefixes: Arc<PrefixIndex>,
    page_size: usize,
}

impl BootstrapLoader {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        ranked: Arc<dyn RankedStore>,
        prefixes: Arc<PrefixIndex>,
        page_size: usize,
    ) -> Self {
        Self {
            durable,
            ranked,
            prefixes,
            page_size: page_size.max(1),
        }
    }

    /// Stream every durable row into the in-memory structures
    pub async fn load(&self, deadline: Deadline) -> Result<BootstrapReport, LeaderboardError> {
        let mut report = BootstrapReport::default();
        let mut cursor = 0i64;

        log::info!("📥 Bootstrapping leaderboard (page size {})", self.page_size);

        loop {
            if deadline.is_expired() {
                log::warn!("⚠️  Bootstrap cancelled after {} members", report.members);
                return Err(LeaderboardError::Timeout);
            }

            let rows = timeout_at(
                deadline.instant(),
                self.durable.fetch_users_after(cursor, self.page_size),
            )
            .await
            .map_err(|_| LeaderboardError::Timeout)??;
            let count = rows.len();

            for row in &rows {
                self.ranked.upsert(&row.username, row.rating).await?;
                self.prefixes.add_member(&row.username);
                cursor = row.user_id;
            }

            if count > 0 {
                report.pages += 1;
                report.members += count;
                log::debug!(
                    "📥 Loaded page {} ({} rows), cursor user_id={}, {}ms left",
                    report.pages,
                    count,
                    cursor,
                    deadline.remaining().as_millis()
                );
            }

            if count < self.page_size {
                break;
            }
        }

        report.last_user_id = cursor;
        log::info!(
            "✅ Bootstrap complete: {} members in {} pages",
            report.members,
            report.pages
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDurableStore;
    use crate::ranking::InMemoryRankedStore;
    use std::time::Duration;

    struct Fixture {
        durable: Arc<SqliteDurableStore>,
        ranked: Arc<InMemoryRankedStore>,
        prefixes: Arc<PrefixIndex>,
    }

    impl Fixture {
        async fn with_users(count: usize) -> Self {
            let durable = Arc::new(SqliteDurableStore::open(":memory:").unwrap());
            let users = (0..count)
                .map(|i| (format!("Player{}", i), (i * 7 % 100) as i64))
                .collect();
            durable.insert_users(users).await.unwrap();
            Self {
                durable,
                ranked: Arc::new(InMemoryRankedStore::new()),
                prefixes: Arc::new(PrefixIndex::new()),
            }
        }

        fn loader(&self, page_size: usize) -> BootstrapLoader {
            BootstrapLoader::new(
                self.durable.clone(),
                self.ranked.clone(),
                self.prefixes.clone(),
                page_size,
            )
        }
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_loads_all_pages() {
        let fixture = Fixture::with_users(25).await;
        let report = fixture.loader(10).load(deadline()).await.unwrap();

        assert_eq!(report.members, 25);
        assert_eq!(report.pages, 3);
        assert_eq!(fixture.ranked.size().await.unwrap(), 25);
        assert_eq!(fixture.ranked.score("Player3").await.unwrap(), Some(21));
        assert!(fixture.prefixes.search("player2").contains("Player24"));
    }

    #[tokio::test]
    async fn test_full_range_matches_durable_rows() {
        let fixture = Fixture::with_users(2503).await;
        let report = fixture.loader(1000).load(deadline()).await.unwrap();
        assert_eq!(report.pages, 3);

        let mut loaded: Vec<(String, i64)> = fixture
            .ranked
            .range_by_rank(1, 5000)
            .await
            .unwrap()
            .into_iter()
            .map(|m| (m.username, m.rating))
            .collect();
        loaded.sort();

        let mut expected: Vec<(String, i64)> = (0..2503)
            .map(|i| (format!("Player{}", i), (i * 7 % 100) as i64))
            .collect();
        expected.sort();

        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        let fixture = Fixture::with_users(20).await;
        let report = fixture.loader(10).load(deadline()).await.unwrap();

        // Third fetch returns zero rows and ends the loop
        assert_eq!(report.members, 20);
        assert_eq!(report.pages, 2);
    }

    #[tokio::test]
    async fn test_empty_durable_store() {
        let fixture = Fixture::with_users(0).await;
        let report = fixture.loader(10).load(deadline()).await.unwrap();

        assert_eq!(report, BootstrapReport::default());
        assert_eq!(fixture.ranked.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let fixture = Fixture::with_users(15).await;
        let loader = fixture.loader(4);

        loader.load(deadline()).await.unwrap();
        let first = fixture.ranked.range_by_rank(1, 100).await.unwrap();
        let prefix_count = fixture.prefixes.len();

        loader.load(deadline()).await.unwrap();
        assert_eq!(fixture.ranked.range_by_rank(1, 100).await.unwrap(), first);
        assert_eq!(fixture.prefixes.len(), prefix_count);
    }

    #[tokio::test]
    async fn test_expired_deadline_fails() {
        let fixture = Fixture::with_users(5).await;
        let expired = Deadline::at(tokio::time::Instant::now());

        let result = fixture.loader(10).load(expired).await;
        assert!(matches!(result, Err(LeaderboardError::Timeout)));
    }
}
