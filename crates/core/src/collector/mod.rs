//! Profile collection from the platform's list, search and lookup endpoints.
//!
//! Every entry point pulls pages through the fetcher, stores the profiles it
//! sees and hands a per-page [`BlockCandidateSet`] to the block list store.

mod cron;
mod explicit;
mod export;
mod ids;
mod search;

pub use cron::ScanOutcome;
pub use export::{export_file_name, write_export};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiRequest, Endpoint};
use crate::blocklist::{BlockCandidateSet, BlockListKind, BlocklistStore};
use crate::config::DaemonConfig;
use crate::fetcher::{FetchContext, FetchError};
use crate::profile::{is_protected, parse_user, ProfileError, ProfileRecord, ProfileStore};
use crate::scan::ScanJobStore;
use crate::storage::StoreError;
use crate::wordlist::{Matcher, WordlistError};

/// Default name of the private list read by [`ProfileCollector::from_list`].
pub const DEFAULT_LIST_NAME: &str = "TERMBLOCK";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Wordlist error: {0}")]
    Wordlist(#[from] WordlistError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Cannot find private list \"{0}\"")]
    ListNotFound(String),

    #[error("No ids found in {0}")]
    NoIds(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl CollectError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CollectError::Fetch(FetchError::Cancelled))
    }
}

/// Counters of one collection call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub pages: usize,
    pub profiles_seen: usize,
    /// Ids selected for a list (matched, or explicitly listed).
    pub candidates: usize,
    /// Ids new to the list they were added to.
    pub listed: usize,
    pub ids_seen: usize,
    /// Ids stored as new unscanned stubs.
    pub ids_inserted: usize,
}

impl CollectReport {
    pub fn merge(&mut self, other: CollectReport) {
        self.pages += other.pages;
        self.profiles_seen += other.profiles_seen;
        self.candidates += other.candidates;
        self.listed += other.listed;
        self.ids_seen += other.ids_seen;
        self.ids_inserted += other.ids_inserted;
    }
}

/// Which profiles of a page become candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    /// Profiles the matcher flags.
    Matched,
    /// Every profile; used for explicitly named accounts.
    Everyone,
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Ids per `users/lookup` call.
    pub lookup_batch_size: usize,
    /// Pause after each finished scan job.
    pub scan_follow_pause: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::from(&DaemonConfig::default())
    }
}

impl From<&DaemonConfig> for CollectOptions {
    fn from(config: &DaemonConfig) -> Self {
        Self {
            lookup_batch_size: config.lookup_batch_size,
            scan_follow_pause: Duration::from_secs(config.scan_follow_pause_secs),
        }
    }
}

/// Collects profiles, matches them and fills the block lists.
pub struct ProfileCollector {
    ctx: FetchContext,
    matcher: Matcher,
    profiles: Arc<dyn ProfileStore>,
    blocklist: Arc<dyn BlocklistStore>,
    scan_jobs: Arc<dyn ScanJobStore>,
    options: CollectOptions,
}

impl ProfileCollector {
    pub fn new<S>(ctx: FetchContext, matcher: Matcher, store: Arc<S>) -> Self
    where
        S: ProfileStore + BlocklistStore + ScanJobStore + 'static,
    {
        Self {
            ctx,
            matcher,
            profiles: store.clone(),
            blocklist: store.clone(),
            scan_jobs: store,
            options: CollectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CollectOptions) -> Self {
        self.options = options;
        self
    }

    /// Swap in a freshly loaded word list.
    pub fn set_matcher(&mut self, matcher: Matcher) {
        self.matcher = matcher;
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Store one page of user objects and list the selected ones.
    fn absorb_users<'v, I>(
        &self,
        users: I,
        selection: Selection,
        kind: BlockListKind,
        report: &mut CollectReport,
    ) -> Result<(), CollectError>
    where
        I: IntoIterator<Item = &'v Value>,
    {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut candidates = BlockCandidateSet::new();

        for user in users {
            let record = match parse_user(user) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Skipping user object");
                    continue;
                }
            };

            if !seen.insert(record.id) {
                continue;
            }

            let selected = match selection {
                Selection::Everyone => true,
                Selection::Matched => self.matcher.is_match(&record.match_fields())?,
            };
            if selected {
                debug!(id = record.id, screen_name = %record.screen_name, "Candidate");
                candidates.insert(record.id);
            }

            records.push(record);
        }

        self.profiles.upsert(&records)?;
        report.profiles_seen += records.len();
        report.candidates += candidates.len();

        if candidates.is_empty() {
            debug!(profiles = records.len(), "No candidates on this page");
            return Ok(());
        }

        let listed = self.blocklist.add_candidates(&candidates.ids(), kind)?;
        report.listed += listed;
        info!(
            profiles = records.len(),
            candidates = candidates.len(),
            new = listed,
            %kind,
            "Candidates listed"
        );

        Ok(())
    }

    /// Fetch and store one profile by screen name.
    ///
    /// Returns the record and whether the account is protected, or `None`
    /// if it cannot be resolved.
    async fn resolve_profile(
        &self,
        screen_name: &str,
    ) -> Result<Option<(ProfileRecord, bool)>, CollectError> {
        if screen_name.is_empty() {
            return Err(CollectError::InvalidTarget("empty screen name".to_string()));
        }

        let request = ApiRequest::new(Endpoint::UsersShow)
            .param("screen_name", screen_name)
            .param("include_entities", "false");

        let user = match self.ctx.fetch_single(request).await {
            Ok(user) => user,
            Err(FetchError::NotFound) => {
                warn!(screen_name, "User not found");
                return Ok(None);
            }
            Err(FetchError::Aborted(reason)) => {
                warn!(screen_name, reason = %reason, "Could not fetch user");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let record = parse_user(&user)?;
        self.profiles.upsert(std::slice::from_ref(&record))?;
        info!(screen_name = %record.screen_name, id = record.id, "Profile updated");

        Ok(Some((record, is_protected(&user))))
    }
}

/// Order-preserving dedup of user supplied names.
fn unique_names<S: AsRef<str>>(names: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty() && seen.insert(n.to_lowercase()))
        .collect()
}
