//! Ranked membership store
//!
//! Members are totally ordered by rating descending, ties broken by username
//! ascending (byte order). Rank is tie-sharing: `1 + count(rating > mine)`,
//! so equal ratings always report the same rank while still occupying
//! distinct positions in range queries.
//!
//! `RankedSet` keeps a sorted `Vec<(Reverse<rating>, Arc<str>)>` for binary
//! search rank lookups and contiguous range scans, plus a
//! `HashMap<Arc<str>, rating>` for O(1) member lookups. Member strings are
//! shared between both structures.

use super::types::Member;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid member: {0}")]
    InvalidMember(String),
}

/// Contract for the ranked membership store.
///
/// Each call is atomic on its own; nothing is atomic across calls.
#[async_trait]
pub trait RankedStore: Send + Sync {
    /// Insert a member or replace its rating
    async fn upsert(&self, username: &str, rating: i64) -> Result<(), StoreError>;

    /// Remove a member. Returns `true` if it existed.
    async fn remove(&self, username: &str) -> Result<bool, StoreError>;

    /// Current rating of a member
    async fn score(&self, username: &str) -> Result<Option<i64>, StoreError>;

    /// 1-based tie-sharing rank of a member
    async fn rank_of(&self, username: &str) -> Result<Option<u64>, StoreError>;

    /// Up to `count` members starting at 1-based position `start_rank`
    async fn range_by_rank(&self, start_rank: u64, count: usize) -> Result<Vec<Member>, StoreError>;

    /// Total member count
    async fn size(&self) -> Result<usize, StoreError>;

    /// Member at a 1-based position in the total order
    async fn sample_at_rank(&self, position: u64) -> Result<Option<Member>, StoreError>;

    /// Short backend name, logged at startup
    fn backend_type(&self) -> &'static str;
}

/// Sorted set of members, not synchronized.
#[derive(Debug, Default)]
pub struct RankedSet {
    sorted: Vec<(Reverse<i64>, Arc<str>)>,
    ratings: HashMap<Arc<str>, i64>,
}

impl RankedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn search_idx(&self, rating: i64, username: &str) -> Result<usize, usize> {
        let key = Reverse(rating);
        self.sorted
            .binary_search_by(|(r, name)| (r, &**name).cmp(&(&key, username)))
    }

    /// Insert or update. Returns `true` if the member is new.
    pub fn upsert(&mut self, username: &str, rating: i64) -> bool {
        let existing = self
            .ratings
            .get_key_value(username)
            .map(|(name, &old)| (Arc::clone(name), old));

        match existing {
            Some((_, old)) if old == rating => false,
            Some((name, old)) => {
                if let Ok(idx) = self.search_idx(old, &name) {
                    self.sorted.remove(idx);
                }
                self.ratings.insert(Arc::clone(&name), rating);
                let idx = self.search_idx(rating, &name).unwrap_or_else(|idx| idx);
                self.sorted.insert(idx, (Reverse(rating), name));
                false
            }
            None => {
                let name: Arc<str> = Arc::from(username);
                self.ratings.insert(Arc::clone(&name), rating);
                let idx = self.search_idx(rating, &name).unwrap_or_else(|idx| idx);
                self.sorted.insert(idx, (Reverse(rating), name));
                true
            }
        }
    }

    pub fn remove(&mut self, username: &str) -> bool {
        match self.ratings.remove_entry(username) {
            Some((name, rating)) => {
                if let Ok(idx) = self.search_idx(rating, &name) {
                    self.sorted.remove(idx);
                }
                true
            }
            None => false,
        }
    }

    pub fn score(&self, username: &str) -> Option<i64> {
        self.ratings.get(username).copied()
    }

    /// Number of members with a rating strictly greater than `rating`
    pub fn count_above(&self, rating: i64) -> usize {
        self.sorted.partition_point(|(r, _)| r.0 > rating)
    }

    pub fn rank_of(&self, username: &str) -> Option<u64> {
        let rating = self.score(username)?;
        Some(self.count_above(rating) as u64 + 1)
    }

    /// Position 0 is treated like position 1.
    pub fn range_by_rank(&self, start_rank: u64, count: usize) -> Vec<Member> {
        let start = usize::try_from(start_rank.saturating_sub(1)).unwrap_or(usize::MAX);
        if start >= self.sorted.len() || count == 0 {
            return Vec::new();
        }
        let end = start.saturating_add(count).min(self.sorted.len());

        self.sorted[start..end]
            .iter()
            .map(|(rating, name)| Member::new(name.as_ref(), rating.0))
            .collect()
    }

    pub fn sample_at_rank(&self, position: u64) -> Option<Member> {
        let idx = usize::try_from(position.checked_sub(1)?).ok()?;
        self.sorted
            .get(idx)
            .map(|(rating, name)| Member::new(name.as_ref(), rating.0))
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// In-process ranked store guarded by a single readers-writer lock.
#[derive(Debug, Default)]
pub struct InMemoryRankedStore {
    set: RwLock<RankedSet>,
}

impl InMemoryRankedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankedStore for InMemoryRankedStore {
    async fn upsert(&self, username: &str, rating: i64) -> Result<(), StoreError> {
        if username.is_empty() {
            return Err(StoreError::InvalidMember("username cannot be empty".to_string()));
        }
        self.set.write().upsert(username, rating);
        Ok(())
    }

    async fn remove(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.set.write().remove(username))
    }

    async fn score(&self, username: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.set.read().score(username))
    }

    async fn rank_of(&self, username: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.set.read().rank_of(username))
    }

    async fn range_by_rank(&self, start_rank: u64, count: usize) -> Result<Vec<Member>, StoreError> {
        Ok(self.set.read().range_by_rank(start_rank, count))
    }

    async fn size(&self) -> Result<usize, StoreError> {
        Ok(self.set.read().len())
    }

    async fn sample_at_rank(&self, position: u64) -> Result<Option<Member>, StoreError> {
        Ok(self.set.read().sample_at_rank(position))
    }

    fn backend_type(&self) -> &'static str {
        "in-memory"
    }
}
