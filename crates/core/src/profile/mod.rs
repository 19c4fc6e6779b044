//! Fetched account profiles.

mod parse;
mod store;
mod types;

pub use parse::{is_protected, parse_created_at, parse_id, parse_user};
pub use store::ProfileStore;
pub use types::{ProfileRecord, ProfileStatus, Tombstone};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("User object has no usable id")]
    MissingId,
}
