use serde::{Deserialize, Serialize};

/// A ranked member: unique username with its current rating.
///
/// Username identity is case-sensitive; only the prefix index folds case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
    pub rating: i64,
}

impl Member {
    pub fn new(username: impl Into<String>, rating: i64) -> Self {
        Self {
            username: username.into(),
            rating,
        }
    }
}
