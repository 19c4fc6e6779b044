//! Background follower/following scan jobs.

use serde::{Deserialize, Serialize};

use crate::storage::StoreError;

/// Job progress, stored as 0/1/2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Pending,
    Finished,
    Failed,
}

impl ScanStatus {
    pub fn as_i64(&self) -> i64 {
        match self {
            ScanStatus::Pending => 0,
            ScanStatus::Finished => 1,
            ScanStatus::Failed => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(ScanStatus::Pending),
            1 => Some(ScanStatus::Finished),
            2 => Some(ScanStatus::Failed),
            _ => None,
        }
    }
}

/// Account whose followers and followings are to be collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    pub id: u64,
    pub screen_name: String,
    pub status: ScanStatus,
}

impl ScanJob {
    pub fn pending(id: u64, screen_name: impl Into<String>) -> Self {
        Self {
            id,
            screen_name: screen_name.into(),
            status: ScanStatus::Pending,
        }
    }
}

/// Trait for scan job storage backends.
pub trait ScanJobStore: Send + Sync {
    /// Enqueue jobs; a screen name already queued is ignored.
    /// Returns how many jobs were added.
    fn add_jobs(&self, jobs: &[ScanJob]) -> Result<usize, StoreError>;

    /// Pending job with the lowest id.
    fn next_pending(&self) -> Result<Option<ScanJob>, StoreError>;

    fn set_status(&self, id: u64, status: ScanStatus) -> Result<(), StoreError>;

    fn jobs(&self) -> Result<Vec<ScanJob>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for status in [ScanStatus::Pending, ScanStatus::Finished, ScanStatus::Failed] {
            assert_eq!(ScanStatus::from_i64(status.as_i64()), Some(status));
        }
        assert_eq!(ScanStatus::from_i64(9), None);
    }
}
