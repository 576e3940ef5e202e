use crate::deadline::Deadline;
use crate::error::LeaderboardError;
use crate::ranking::{PrefixIndex, RankedStore};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub rank: u64,
    pub username: String,
    pub rating: i64,
}

/// Case-insensitive prefix search joined with live ratings and ranks
pub struct SearchService {
    prefixes: Arc<PrefixIndex>,
    ranked: Arc<dyn RankedStore>,
}

impl SearchService {
    pub fn new(prefixes: Arc<PrefixIndex>, ranked: Arc<dyn RankedStore>) -> Self {
        Self { prefixes, ranked }
    }

    /// Members whose username starts with `fragment`, best rank first
    ///
    /// If the deadline passes mid-way the hits gathered so far are
    /// returned. Candidates are visited in username order, so a partial
    /// result is a stable subset.
    pub async fn search(
        &self,
        fragment: &str,
        deadline: Deadline,
    ) -> Result<Vec<SearchHit>, LeaderboardError> {
        let mut candidates: Vec<String> = self.prefixes.search(fragment).into_iter().collect();
        candidates.sort_unstable();

        let mut hits = Vec::with_capacity(candidates.len());
        for username in candidates {
            if deadline.is_expired() {
                log::debug!(
                    "Search '{}' hit its deadline, returning {} partial hits",
                    fragment,
                    hits.len()
                );
                break;
            }

            let Some(rating) = self.ranked.score(&username).await? else {
                continue;
            };
            let Some(rank) = self.ranked.rank_of(&username).await? else {
                continue;
            };
            hits.push(SearchHit {
                rank,
                username,
                rating,
            });
        }

        hits.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.username.cmp(&b.username)));
        Ok(hits)
    }
}
