//! Per-identity user token storage.
//!
//! Tokens cross a [`TokenCipher`] before they reach a backend, so stores only
//! ever hold sealed values.

mod cipher;
mod verify;

pub use cipher::{HexCipher, TokenCipher};
pub use verify::verify_token;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to seal token: {0}")]
    Seal(String),

    #[error("Failed to open sealed token: {0}")]
    Open(String),
}

/// Authenticated account a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: u64,
    pub screen_name: String,
}

/// Trait for token storage backends, keyed by identity.
pub trait TokenStore: Send + Sync {
    /// Store or replace the token of an identity.
    fn store(&self, identity: &Identity, token: &str) -> Result<(), TokenError>;

    fn get(&self, user_id: u64) -> Result<Option<String>, TokenError>;

    /// Case-insensitive lookup by screen name.
    fn get_by_screen_name(&self, screen_name: &str)
        -> Result<Option<(Identity, String)>, TokenError>;

    fn has(&self, user_id: u64) -> Result<bool, TokenError>;

    fn clear(&self, user_id: u64) -> Result<(), TokenError>;
}
