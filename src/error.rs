use crate::db::DbError;
use crate::pipeline::PipelineError;
use crate::ranking::StoreError;

/// Errors surfaced by the leaderboard services
///
/// Validation problems never show up here: bad pagination input is clamped
/// to defaults, and missing members are skipped rather than reported.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error(transparent)]
    RankedStore(#[from] StoreError),

    #[error(transparent)]
    Durable(#[from] DbError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("request cancelled")]
    Timeout,

    #[error("leaderboard empty")]
    EmptyLeaderboard,
}

impl LeaderboardError {
    /// Caller deadline exceeded, as opposed to an upstream failure
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            LeaderboardError::Timeout | LeaderboardError::Pipeline(PipelineError::EnqueueTimeout)
        )
    }
}
