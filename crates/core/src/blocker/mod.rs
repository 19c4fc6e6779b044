//! Block runner: turns the stored block list into `blocks/create` calls.

mod executor;

pub use executor::BlockExecutor;

use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;
use crate::blocklist::PendingBlock;
use crate::config::BlockConfig;
use crate::fetcher::FetchError;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Non-transport client failure, e.g. no user token.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl BlockError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BlockError::Fetch(FetchError::Cancelled))
    }
}

/// A block candidate with the number of failed attempts so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryableItem {
    pub id: u64,
    pub screen_name: String,
    pub retries: u32,
}

impl From<PendingBlock> for RetryableItem {
    fn from(pending: PendingBlock) -> Self {
        Self {
            id: pending.id,
            screen_name: pending.screen_name,
            retries: 0,
        }
    }
}

/// Outcome of one block run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReport {
    pub blocked: usize,
    pub skipped_already_blocked: usize,
    /// Failed attempts that were re-enqueued.
    pub retried: usize,
    /// Set when a candidate ran out of retries; the run stopped there.
    pub halted: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct BlockOptions {
    pub max_retries: u32,
    pub post_block_delay: Duration,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self::from(&BlockConfig::default())
    }
}

impl From<&BlockConfig> for BlockOptions {
    fn from(config: &BlockConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            post_block_delay: Duration::from_millis(config.post_block_delay_ms),
        }
    }
}
