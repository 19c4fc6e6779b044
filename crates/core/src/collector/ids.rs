//! Id list endpoints: followers, followings, retweeters and own blocks.
//!
//! Ids are stored as unscanned stubs and hydrated later by
//! [`ProfileCollector::fetch_profiles`].

use tracing::info;

use crate::api::{parse_status_url, ApiRequest, Endpoint};
use crate::fetcher::{ids_from_page, FetchState, PaginatedFetcher};

use super::{CollectError, CollectReport, ProfileCollector};

impl ProfileCollector {
    /// Page through an id endpoint, storing each page's ids as it arrives.
    pub(super) async fn ingest_ids(&self, request: ApiRequest) -> Result<CollectReport, CollectError> {
        let endpoint = request.endpoint;
        let mut fetcher = PaginatedFetcher::new(&self.ctx, request.param("stringify_ids", "false"));
        let mut report = CollectReport::default();

        while let Some(page) = fetcher.next_page().await? {
            let ids = ids_from_page(&page, "ids");
            report.pages += 1;
            report.ids_seen += ids.len();
            report.ids_inserted += self.profiles.insert_ids(&ids)?;
        }

        if let FetchState::Aborted(reason) = fetcher.state() {
            info!(%endpoint, reason = %reason, "Id fetch stopped early");
        }
        info!(
            %endpoint,
            pages = report.pages,
            ids = report.ids_seen,
            new = report.ids_inserted,
            "Ids stored"
        );

        Ok(report)
    }

    pub async fn from_followers(&self, screen_name: &str) -> Result<CollectReport, CollectError> {
        self.ingest_ids(ApiRequest::new(Endpoint::FollowersIds).param("screen_name", screen_name))
            .await
    }

    pub async fn from_following(&self, screen_name: &str) -> Result<CollectReport, CollectError> {
        self.ingest_ids(ApiRequest::new(Endpoint::FriendsIds).param("screen_name", screen_name))
            .await
    }

    pub async fn from_followers_and_following<S: AsRef<str>>(
        &self,
        screen_names: &[S],
    ) -> Result<CollectReport, CollectError> {
        let mut report = CollectReport::default();
        for screen_name in screen_names {
            report.merge(self.from_followers(screen_name.as_ref()).await?);
            report.merge(self.from_following(screen_name.as_ref()).await?);
        }
        Ok(report)
    }

    /// Accounts that retweeted the status at `status_url` (or a bare id).
    pub async fn from_retweets(&self, status_url: &str) -> Result<CollectReport, CollectError> {
        let status_id = parse_status_url(status_url)
            .status_id
            .ok_or_else(|| CollectError::InvalidTarget(format!("no status id in '{}'", status_url)))?;

        self.ingest_ids(
            ApiRequest::new(Endpoint::RetweetersIds)
                .param("id", status_id)
                .param("count", "100"),
        )
        .await
    }

    /// Accounts the authenticated user already blocks.
    pub async fn from_blocklist(&self) -> Result<CollectReport, CollectError> {
        self.ingest_ids(ApiRequest::new(Endpoint::BlocksIds)).await
    }
}
