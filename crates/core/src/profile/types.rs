//! Profile record types.

use serde::{Deserialize, Serialize};

/// One fetched account, as stored and matched.
///
/// `id` is the 64-bit account id; it is parsed from the string form of the
/// platform payload and never goes through a float.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub followers_count: u64,
    pub friends_count: u64,
    /// Unix seconds; 0 when unknown.
    pub created_at: i64,
    pub verified: bool,
}

impl ProfileRecord {
    pub fn new(id: u64, screen_name: impl Into<String>) -> Self {
        Self {
            id,
            screen_name: screen_name.into(),
            ..Default::default()
        }
    }

    /// The text fields handed to the matcher, in matching order.
    pub fn match_fields(&self) -> [&str; 3] {
        [&self.name, &self.description, &self.location]
    }
}

/// Permanent marker stored in place of a screen name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tombstone {
    NotFound,
    Suspended,
}

impl Tombstone {
    pub const ALL: [Tombstone; 2] = [Tombstone::NotFound, Tombstone::Suspended];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tombstone::NotFound => "[NOT_FOUND]",
            Tombstone::Suspended => "[SUSPENDED]",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// What the store knows about an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    /// Id known, profile not fetched yet.
    Unscanned,
    Scanned(ProfileRecord),
    Tombstoned(Tombstone),
}
