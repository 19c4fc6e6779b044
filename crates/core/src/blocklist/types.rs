//! Block list kinds, per-page candidate sets and stored entries.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target list of a collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockListKind {
    /// Block list plus the always list.
    Always,
    #[default]
    Block,
    /// Exclusion list only.
    Never,
}

impl BlockListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockListKind::Always => "always",
            BlockListKind::Block => "block",
            BlockListKind::Never => "never",
        }
    }
}

impl fmt::Display for BlockListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(BlockListKind::Always),
            "block" => Ok(BlockListKind::Block),
            "never" => Ok(BlockListKind::Never),
            other => Err(format!(
                "unknown list kind '{}', expected always, block or never",
                other
            )),
        }
    }
}

/// Ids selected while processing one page. Built fresh per page and handed
/// to the block list store right after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockCandidateSet {
    ids: BTreeSet<u64>,
}

impl BlockCandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-adding an id is a no-op; returns whether it was new.
    pub fn insert(&mut self, id: u64) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.ids.iter().copied().collect()
    }
}

impl FromIterator<u64> for BlockCandidateSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Block list entry still to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBlock {
    pub id: u64,
    pub screen_name: String,
}

/// Block list entry joined with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistEntry {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
    pub description: String,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("always".parse::<BlockListKind>(), Ok(BlockListKind::Always));
        assert_eq!(" Block ".parse::<BlockListKind>(), Ok(BlockListKind::Block));
        assert_eq!("NEVER".parse::<BlockListKind>(), Ok(BlockListKind::Never));
        assert!("sometimes".parse::<BlockListKind>().is_err());
        assert_eq!(BlockListKind::default(), BlockListKind::Block);
    }

    #[test]
    fn test_candidate_set_is_idempotent() {
        let mut set = BlockCandidateSet::new();
        assert!(set.insert(2));
        assert!(set.insert(1));
        assert!(!set.insert(2));
        assert_eq!(set.len(), 2);
        assert_eq!(set.ids(), vec![1, 2]);
        assert!(set.contains(1));
    }
}
