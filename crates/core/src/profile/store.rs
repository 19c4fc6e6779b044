//! Profile storage trait.

use crate::storage::StoreError;

use super::types::{ProfileRecord, ProfileStatus};

/// Trait for profile storage backends.
pub trait ProfileStore: Send + Sync {
    /// Insert or overwrite full records.
    fn upsert(&self, records: &[ProfileRecord]) -> Result<(), StoreError>;

    /// Insert unscanned stubs; known ids are left untouched.
    /// Returns how many ids were new.
    fn insert_ids(&self, ids: &[u64]) -> Result<usize, StoreError>;

    /// Tombstone the given ids as `[NOT_FOUND]`.
    fn mark_not_found(&self, ids: &[u64]) -> Result<(), StoreError>;

    /// Up to `limit` ids whose profile has not been fetched yet.
    fn select_unscanned_ids(&self, limit: usize) -> Result<Vec<u64>, StoreError>;

    /// Current state of an id, `None` if unknown.
    fn status(&self, id: u64) -> Result<Option<ProfileStatus>, StoreError>;
}
