//! Tweet search based collection.

use serde_json::Value;
use tracing::debug;

use crate::api::{parse_status_url, ApiRequest, Endpoint};
use crate::blocklist::BlockListKind;
use crate::fetcher::PaginatedFetcher;

use super::{CollectError, CollectReport, ProfileCollector, Selection};

/// Whether `tweet` replies to `status_id`; every tweet passes without one.
fn is_reply_to(tweet: &Value, status_id: Option<&str>) -> bool {
    match status_id {
        None => true,
        Some(id) => tweet.get("in_reply_to_status_id_str").and_then(Value::as_str) == Some(id),
    }
}

impl ProfileCollector {
    /// Direct replies to a status, found by searching `to:<author>`.
    ///
    /// Only replies whose parent is the given status are considered. The
    /// search index is recent-only, older replies are missed.
    pub async fn from_mentions(
        &self,
        status_url: &str,
        kind: BlockListKind,
    ) -> Result<CollectReport, CollectError> {
        let target = parse_status_url(status_url);
        let screen_name = target
            .screen_name
            .ok_or_else(|| CollectError::InvalidTarget(format!("no screen name in '{}'", status_url)))?;

        let mut request = ApiRequest::new(Endpoint::SearchTweets).param("q", format!("to:{}", screen_name));
        if let Some(id) = &target.status_id {
            request.set_param("since_id", id.clone());
        }
        let request = request
            .param("count", "100")
            .param("include_entities", "false")
            .param("result_type", "mixed");

        self.collect_search(request, target.status_id.as_deref(), kind).await
    }

    /// Authors of tweets matching a search query.
    pub async fn from_search(
        &self,
        query: &str,
        kind: BlockListKind,
    ) -> Result<CollectReport, CollectError> {
        let request = ApiRequest::new(Endpoint::SearchTweets)
            .param("q", query)
            .param("count", "100")
            .param("include_entities", "false")
            .param("result_type", "mixed");

        self.collect_search(request, None, kind).await
    }

    async fn collect_search(
        &self,
        request: ApiRequest,
        reply_to: Option<&str>,
        kind: BlockListKind,
    ) -> Result<CollectReport, CollectError> {
        let mut fetcher = PaginatedFetcher::new(&self.ctx, request);
        let mut report = CollectReport::default();

        while let Some(page) = fetcher.next_page().await? {
            report.pages += 1;

            let Some(statuses) = page.get("statuses").and_then(Value::as_array) else {
                debug!("Search page without statuses, stopping");
                break;
            };

            let users = statuses
                .iter()
                .filter(|tweet| is_reply_to(tweet, reply_to))
                .filter_map(|tweet| tweet.get("user"));

            self.absorb_users(users, Selection::Matched, kind, &mut report)?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_reply_to() {
        let reply = json!({"in_reply_to_status_id_str": "10"});
        let other = json!({"in_reply_to_status_id_str": "11"});
        let plain = json!({});

        assert!(is_reply_to(&reply, Some("10")));
        assert!(!is_reply_to(&other, Some("10")));
        assert!(!is_reply_to(&plain, Some("10")));
        assert!(is_reply_to(&plain, None));
    }
}
