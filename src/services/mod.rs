//! Request-scoped leaderboard operations
//!
//! Every entry point takes a `Deadline`. Reads go to the ranked store and
//! prefix index only; the durable store is touched by bootstrap and, via
//! the update queue, by the simulator.

pub mod bootstrap;
pub mod rank_query;
pub mod search;
pub mod simulator;

pub use bootstrap::{BootstrapLoader, BootstrapReport};
pub use rank_query::{PageRequest, RankQueryService, RankedEntry};
pub use search::{SearchHit, SearchService};
pub use simulator::{LoadSimulator, SimulationReport};
