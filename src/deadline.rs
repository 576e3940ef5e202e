//! Request deadlines
//!
//! Every request-scoped operation (bootstrap, page fetch, search, simulate)
//! receives a `Deadline` from its caller. Strict operations abort once it has
//! passed; best-effort ones stop early and return what they have.

use std::time::Duration;
use tokio::time::Instant;

/// Point in time after which a request must stop doing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Deadline at a fixed instant
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}

/// Per-route request timeouts.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeouts {
    pub bootstrap: Duration,
    pub leaderboard: Duration,
    pub search: Duration,
    pub simulate: Duration,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            bootstrap: Duration::from_secs(10),
            leaderboard: Duration::from_secs(10),
            search: Duration::from_secs(5),
            simulate: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_deadline() {
        let deadline = Deadline::at(Instant::now());
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_future_deadline() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(!deadline.is_expired());
        assert!(deadline.remaining() > Duration::from_secs(59));
    }
}
