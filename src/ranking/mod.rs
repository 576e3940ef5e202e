//! In-memory ranking structures: the ranked membership store and the
//! prefix index kept consistent with it.

pub mod prefix;
pub mod store;
pub mod types;

pub use prefix::PrefixIndex;
pub use store::{InMemoryRankedStore, RankedSet, RankedStore, StoreError};
pub use types::Member;
