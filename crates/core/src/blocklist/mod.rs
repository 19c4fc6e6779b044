//! Block, always and never lists.

mod store;
mod types;

pub use store::BlocklistStore;
pub use types::{BlockCandidateSet, BlockListKind, BlocklistEntry, PendingBlock};
