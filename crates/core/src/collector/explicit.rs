//! Explicitly named accounts: screen names, private lists and JSON imports.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiRequest, Endpoint};
use crate::blocklist::{BlockCandidateSet, BlockListKind};
use crate::fetcher::{FetchError, PaginatedFetcher};
use crate::profile::parse_id;

use super::{unique_names, CollectError, CollectReport, ProfileCollector, Selection, DEFAULT_LIST_NAME};

impl ProfileCollector {
    /// Fetch each named account and put all of them on the `kind` list.
    /// No matching is done.
    pub async fn from_screen_names<S: AsRef<str>>(
        &self,
        screen_names: &[S],
        kind: BlockListKind,
    ) -> Result<CollectReport, CollectError> {
        let mut report = CollectReport::default();
        let mut candidates = BlockCandidateSet::new();

        for screen_name in unique_names(screen_names) {
            if let Some((record, _)) = self.resolve_profile(screen_name).await? {
                report.profiles_seen += 1;
                candidates.insert(record.id);
            }
        }

        report.candidates = candidates.len();
        if !candidates.is_empty() {
            report.listed = self.blocklist.add_candidates(&candidates.ids(), kind)?;
            info!(count = candidates.len(), new = report.listed, %kind, "Screen names listed");
        }

        Ok(report)
    }

    /// Members of a private list of the account `owner_id`, found by
    /// case-insensitive name, all put on the `kind` list.
    pub async fn from_list(
        &self,
        owner_id: u64,
        list_name: Option<&str>,
        kind: BlockListKind,
    ) -> Result<CollectReport, CollectError> {
        let list_name = list_name.unwrap_or(DEFAULT_LIST_NAME);
        let list_id = self
            .find_private_list(owner_id, list_name)
            .await?
            .ok_or_else(|| CollectError::ListNotFound(list_name.to_string()))?;

        let request = ApiRequest::new(Endpoint::ListsMembers)
            .param("list_id", list_id.to_string())
            .param("user_id", owner_id.to_string())
            .param("include_entities", "false")
            .param("skip_status", "true")
            .param("count", "100");

        let mut fetcher = PaginatedFetcher::new(&self.ctx, request);
        let mut report = CollectReport::default();

        while let Some(page) = fetcher.next_page().await? {
            report.pages += 1;
            if let Some(users) = page.get("users").and_then(Value::as_array) {
                self.absorb_users(users, Selection::Everyone, kind, &mut report)?;
            }
        }

        info!(list = list_name, members = report.profiles_seen, "List imported");
        Ok(report)
    }

    async fn find_private_list(&self, owner_id: u64, list_name: &str) -> Result<Option<u64>, CollectError> {
        let request = ApiRequest::new(Endpoint::ListsList)
            .param("user_id", owner_id.to_string())
            .param("reverse", "true");

        let lists = match self.ctx.fetch_single(request).await {
            Ok(lists) => lists,
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled.into()),
            Err(e) => {
                warn!(error = %e, "Could not fetch lists");
                return Ok(None);
            }
        };

        let wanted = list_name.to_lowercase();
        let found = lists
            .as_array()
            .into_iter()
            .flatten()
            .filter(|list| list.get("mode").and_then(Value::as_str) == Some("private"))
            .find(|list| {
                list.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase() == wanted)
            })
            .and_then(parse_id);

        Ok(found)
    }

    /// Import `[{"id": ...}, ...]` as unscanned stubs.
    pub fn from_json(&self, path: &Path) -> Result<CollectReport, CollectError> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CollectError::Io(format!("{}: {}", shown, e)))?;
        let json: Value =
            serde_json::from_str(&content).map_err(|e| CollectError::Json(format!("{}: {}", shown, e)))?;

        let entries = json
            .as_array()
            .ok_or_else(|| CollectError::Json(format!("{}: not an array", shown)))?;

        let ids: Vec<u64> = entries.iter().filter_map(parse_id).collect();
        if ids.is_empty() {
            return Err(CollectError::NoIds(shown));
        }

        let inserted = self.profiles.insert_ids(&ids)?;
        info!(file = %shown, ids = ids.len(), new = inserted, "Ids imported");

        Ok(CollectReport {
            ids_seen: ids.len(),
            ids_inserted: inserted,
            ..Default::default()
        })
    }
}
