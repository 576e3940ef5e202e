//! Lowercase prefix index for username search
//!
//! Every prefix (1..=len chars) of `lowercase(username)` maps to the set of
//! usernames sharing it. Storage and lookup are both lowercase-only, so a
//! fragment in any case resolves to the same set.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PrefixIndex {
    prefixes: RwLock<HashMap<String, HashSet<Arc<str>>>>,
}

/// All char-boundary prefixes of the lowercased username
fn lowercase_prefixes(username: &str) -> impl Iterator<Item = String> {
    let lower = username.to_lowercase();
    let ends: Vec<usize> = lower
        .char_indices()
        .map(|(idx, ch)| idx + ch.len_utf8())
        .collect();
    ends.into_iter().map(move |end| lower[..end].to_string())
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `username` under all of its lowercase prefixes
    pub fn add_member(&self, username: &str) {
        if username.is_empty() {
            return;
        }
        let name: Arc<str> = Arc::from(username);
        let mut prefixes = self.prefixes.write();
        for prefix in lowercase_prefixes(username) {
            prefixes.entry(prefix).or_default().insert(Arc::clone(&name));
        }
    }

    /// Prune `username` from every prefix set, dropping sets that become empty
    pub fn remove_member(&self, username: &str) {
        let mut prefixes = self.prefixes.write();
        for prefix in lowercase_prefixes(username) {
            if let Some(set) = prefixes.get_mut(&prefix) {
                set.remove(username);
                if set.is_empty() {
                    prefixes.remove(&prefix);
                }
            }
        }
    }

    /// Exact lookup on a stored (lowercase) prefix key
    pub fn lookup(&self, prefix: &str) -> HashSet<String> {
        self.prefixes
            .read()
            .get(prefix)
            .map(|set| set.iter().map(|name| name.to_string()).collect())
            .unwrap_or_default()
    }

    /// Case-insensitive search: the fragment is folded to lowercase first
    pub fn search(&self, fragment: &str) -> HashSet<String> {
        if fragment.is_empty() {
            return HashSet::new();
        }
        self.lookup(&fragment.to_lowercase())
    }

    /// Number of distinct stored prefixes
    pub fn len(&self) -> usize {
        self.prefixes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.read().is_empty()
    }
}
