//! Block list storage trait.

use crate::storage::StoreError;

use super::types::{BlockListKind, BlocklistEntry, PendingBlock};

/// Trait for block list storage backends.
pub trait BlocklistStore: Send + Sync {
    /// Add ids to the list(s) of `kind`. Known ids are ignored.
    /// Returns how many ids were new on the primary list of that kind.
    fn add_candidates(&self, ids: &[u64], kind: BlockListKind) -> Result<usize, StoreError>;

    fn contains(&self, id: u64, kind: BlockListKind) -> Result<bool, StoreError>;

    /// Drop an id from the block list.
    fn remove(&self, id: u64) -> Result<(), StoreError>;

    /// Block list entries with a scanned, non-tombstoned profile.
    fn pending_blocks(&self) -> Result<Vec<PendingBlock>, StoreError>;

    /// Ids of stored profiles not on the block or never list whose
    /// lowercased name, bio or location contains `term`.
    fn find_unlisted_matching(&self, term: &str) -> Result<Vec<u64>, StoreError>;

    /// Block list joined with profiles, for export.
    fn entries(&self) -> Result<Vec<BlocklistEntry>, StoreError>;
}
