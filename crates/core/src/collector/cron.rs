//! Steps run repeatedly by the daemons.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::api::{ApiRequest, Endpoint};
use crate::blocklist::BlockListKind;
use crate::fetcher::FetchError;
use crate::profile::parse_id;
use crate::scan::{ScanJob, ScanStatus};
use crate::wordlist::WordlistError;

use super::{unique_names, CollectError, CollectReport, ProfileCollector, Selection};

/// Result of one [`ProfileCollector::scan_follow`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// The job with its new status.
    pub job: ScanJob,
    pub report: CollectReport,
}

impl ProfileCollector {
    /// Hydrate one batch of unscanned stubs via `users/lookup` and match
    /// them. Ids the lookup does not return are tombstoned.
    pub async fn fetch_profiles(&self) -> Result<CollectReport, CollectError> {
        let mut report = CollectReport::default();

        let ids = self
            .profiles
            .select_unscanned_ids(self.options.lookup_batch_size)?;
        if ids.is_empty() {
            debug!("No unscanned profiles");
            return Ok(report);
        }

        let id_list = ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
        let request = ApiRequest::new(Endpoint::UsersLookup)
            .param("user_id", id_list)
            .param("include_entities", "false");

        let page = match self.ctx.fetch_single(request).await {
            Ok(page) => page,
            // none of the requested ids exist
            Err(FetchError::NotFound) => {
                self.profiles.mark_not_found(&ids)?;
                info!(count = ids.len(), "Lookup found no profiles, ids tombstoned");
                return Ok(report);
            }
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled.into()),
            Err(e) => {
                warn!(error = %e, "Lookup failed, retrying next run");
                return Ok(report);
            }
        };
        let Some(users) = page.as_array() else {
            warn!("Lookup response is not a user array, retrying next run");
            return Ok(report);
        };
        report.pages = 1;

        let returned: HashSet<u64> = users.iter().filter_map(parse_id).collect();
        let missing: Vec<u64> = ids.iter().copied().filter(|id| !returned.contains(id)).collect();
        if !missing.is_empty() {
            self.profiles.mark_not_found(&missing)?;
            info!(count = missing.len(), "Ids missing from lookup tombstoned");
        }

        self.absorb_users(users, Selection::Matched, BlockListKind::Block, &mut report)?;
        Ok(report)
    }

    /// Process the pending scan job with the lowest id: store its follower and
    /// following ids, then pause. `None` when no job is pending.
    pub async fn scan_follow(&self) -> Result<Option<ScanOutcome>, CollectError> {
        let Some(job) = self.scan_jobs.next_pending()? else {
            debug!("No pending scan jobs");
            return Ok(None);
        };

        let mut report = CollectReport::default();
        let status = match self.resolve_profile(&job.screen_name).await? {
            None => {
                warn!(screen_name = %job.screen_name, "Scan target not found");
                ScanStatus::Failed
            }
            Some((_, true)) => {
                warn!(screen_name = %job.screen_name, "Scan target is protected");
                ScanStatus::Failed
            }
            Some(_) => {
                for endpoint in [Endpoint::FollowersIds, Endpoint::FriendsIds] {
                    info!(screen_name = %job.screen_name, %endpoint, "Scanning");
                    let request = ApiRequest::new(endpoint)
                        .param("user_id", job.id.to_string())
                        .param("screen_name", job.screen_name.clone());
                    report.merge(self.ingest_ids(request).await?);
                }
                ScanStatus::Finished
            }
        };

        self.scan_jobs.set_status(job.id, status)?;
        let job = ScanJob { status, ..job };

        if status == ScanStatus::Finished {
            self.ctx.sleep(self.options.scan_follow_pause).await?;
        }

        Ok(Some(ScanOutcome { job, report }))
    }

    /// Resolve the named accounts and queue them for [`Self::scan_follow`].
    /// Returns how many jobs were new.
    pub async fn add_scan_jobs<S: AsRef<str>>(&self, screen_names: &[S]) -> Result<usize, CollectError> {
        let mut jobs = Vec::new();
        for screen_name in unique_names(screen_names) {
            if let Some((record, _)) = self.resolve_profile(screen_name).await? {
                jobs.push(ScanJob::pending(record.id, record.screen_name));
            }
        }

        if jobs.is_empty() {
            info!("No resolvable screen names to queue");
            return Ok(0);
        }

        let added = self.scan_jobs.add_jobs(&jobs)?;
        info!(requested = jobs.len(), added, "Scan jobs queued");
        Ok(added)
    }

    /// List stored profiles whose text contains an ANY term, without
    /// fetching anything.
    pub fn scan_by_wordlist(&self) -> Result<CollectReport, CollectError> {
        let index = self.matcher.index();
        if index.is_empty() {
            return Err(WordlistError::Empty.into());
        }

        let mut report = CollectReport::default();
        for term in index.any_terms() {
            let ids = self.blocklist.find_unlisted_matching(term)?;
            if ids.is_empty() {
                debug!(term, "Nothing found");
                continue;
            }

            report.candidates += ids.len();
            report.listed += self.blocklist.add_candidates(&ids, BlockListKind::Block)?;
            info!(term, count = ids.len(), "Stored profiles listed");
        }

        Ok(report)
    }
}
