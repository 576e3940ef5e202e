use serde::{Deserialize, Serialize};

/// A rating change waiting to be written back to the durable store.
///
/// Produced by bootstrap-adjacent API calls and the load simulator, applied
/// to the ranked store first, then queued for the worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdateEvent {
    pub username: String,
    pub rating: i64,
}

impl RatingUpdateEvent {
    pub fn new(username: impl Into<String>, rating: i64) -> Self {
        Self {
            username: username.into(),
            rating,
        }
    }
}
