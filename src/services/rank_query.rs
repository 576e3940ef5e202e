use crate::deadline::Deadline;
use crate::error::LeaderboardError;
use crate::ranking::RankedStore;
use serde::Serialize;
use std::sync::Arc;

/// Normalized pagination input
///
/// Out-of-range values fall back to defaults instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: usize,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1) as u64;
        let limit = limit
            .filter(|l| (1..=Self::MAX_LIMIT as i64).contains(l))
            .map(|l| l as usize)
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    /// 1-based rank of the first entry on this page
    pub fn start_rank(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit as u64)
            .saturating_add(1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub username: String,
    pub rating: i64,
    pub rank: u64,
}

/// Paginated reads over the ranked store with tie-aware ranks
pub struct RankQueryService {
    ranked: Arc<dyn RankedStore>,
}

impl RankQueryService {
    pub fn new(ranked: Arc<dyn RankedStore>) -> Self {
        Self { ranked }
    }

    pub async fn page(
        &self,
        request: PageRequest,
        deadline: Deadline,
    ) -> Result<Vec<RankedEntry>, LeaderboardError> {
        if deadline.is_expired() {
            return Err(LeaderboardError::Timeout);
        }

        let members = self
            .ranked
            .range_by_rank(request.start_rank(), request.limit)
            .await?;

        let mut entries = Vec::with_capacity(members.len());
        for member in members {
            if deadline.is_expired() {
                log::warn!(
                    "⚠️  Leaderboard page {} cancelled after {} entries",
                    request.page,
                    entries.len()
                );
                return Err(LeaderboardError::Timeout);
            }

            match self.ranked.rank_of(&member.username).await? {
                Some(rank) => entries.push(RankedEntry {
                    username: member.username,
                    rating: member.rating,
                    rank,
                }),
                // Removed between the range read and the rank lookup
                None => log::debug!("Skipping {} (no longer ranked)", member.username),
            }
        }

        Ok(entries)
    }
}
