use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiRequest, Endpoint};
use crate::blocklist::BlocklistStore;
use crate::fetcher::{rate_limit_wait, transport_backoff, FetchContext};
use crate::profile::ProfileStore;

use super::{BlockError, BlockOptions, BlockReport, RetryableItem};

/// Runs block calls for pending candidates of the authenticated user.
pub struct BlockExecutor {
    ctx: FetchContext,
    profiles: Arc<dyn ProfileStore>,
    blocklist: Arc<dyn BlocklistStore>,
    options: BlockOptions,
}

impl BlockExecutor {
    pub fn new<S>(ctx: FetchContext, store: Arc<S>) -> Self
    where
        S: ProfileStore + BlocklistStore + 'static,
    {
        Self {
            ctx,
            profiles: store.clone(),
            blocklist: store,
            options: BlockOptions::default(),
        }
    }

    /// Use separate stores for profiles and the block list.
    pub fn with_stores(
        ctx: FetchContext,
        profiles: Arc<dyn ProfileStore>,
        blocklist: Arc<dyn BlocklistStore>,
    ) -> Self {
        Self {
            ctx,
            profiles,
            blocklist,
            options: BlockOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BlockOptions) -> Self {
        self.options = options;
        self
    }

    /// Block every pending candidate. Nothing pending is a no-op.
    pub async fn block(&self) -> Result<BlockReport, BlockError> {
        let pending = self.blocklist.pending_blocks()?;
        if pending.is_empty() {
            info!("Block list is empty, nothing to do");
            return Ok(BlockReport::default());
        }

        self.perform_block(pending.into_iter().map(RetryableItem::from).collect())
            .await
    }

    /// Process `items` in FIFO order.
    ///
    /// Accounts already blocked are skipped. A 429 retries the same item
    /// after the reset wait. Other failures re-enqueue the item at the tail
    /// until it has used up `max_retries`; the next failure tombstones its
    /// profile, drops it from the block list and stops the run.
    pub async fn perform_block(&self, items: Vec<RetryableItem>) -> Result<BlockReport, BlockError> {
        let mut report = BlockReport::default();
        if items.is_empty() {
            return Ok(report);
        }

        let blocked = self
            .ctx
            .collect_ids(ApiRequest::new(Endpoint::BlocksIds).param("stringify_ids", "false"))
            .await?;
        if !blocked.is_complete() {
            warn!(state = ?blocked.state, "Blocked id list incomplete");
        }
        let already_blocked: HashSet<u64> = blocked.ids.into_iter().collect();
        info!(
            blocked = already_blocked.len(),
            candidates = items.len(),
            "Starting block run"
        );

        let mut queue: VecDeque<RetryableItem> = items.into();
        let mut transport_failures = 0u32;

        while let Some(mut item) = queue.pop_front() {
            if already_blocked.contains(&item.id) {
                debug!(id = item.id, "Already blocked");
                report.skipped_already_blocked += 1;
                continue;
            }

            let request = ApiRequest::new(Endpoint::BlocksCreate)
                .param("user_id", item.id.to_string())
                .param("include_entities", "false")
                .param("skip_status", "true");

            let response = match self.ctx.client.request(&request).await {
                Ok(response) => response,
                Err(ApiError::Transport(message)) => {
                    transport_failures = transport_failures.saturating_add(1);
                    let wait = transport_backoff(transport_failures, self.ctx.options.transport_backoff_max);
                    warn!(
                        id = item.id,
                        error = %message,
                        wait_secs = wait.as_secs(),
                        "Transport error, re-enqueued"
                    );
                    self.ctx.sleep(wait).await?;
                    queue.push_back(item);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            transport_failures = 0;

            match response.status {
                200 => {
                    report.blocked += 1;
                    info!(screen_name = %item.screen_name, id = item.id, "Blocked");
                    self.ctx.sleep(self.options.post_block_delay).await?;
                }
                429 => {
                    let wait = rate_limit_wait(
                        response.rate_limit_reset(),
                        self.ctx.clock.now_unix(),
                        self.ctx.options.rate_limit_pad_secs,
                    );
                    info!(wait_secs = wait.as_secs(), "Rate limited, waiting for reset");
                    self.ctx.sleep(wait).await?;
                    queue.push_front(item);
                }
                status if item.retries < self.options.max_retries => {
                    item.retries += 1;
                    report.retried += 1;
                    info!(
                        status,
                        retry = item.retries,
                        screen_name = %item.screen_name,
                        id = item.id,
                        "Block failed, re-enqueued"
                    );
                    queue.push_back(item);
                }
                status => {
                    warn!(
                        status,
                        screen_name = %item.screen_name,
                        id = item.id,
                        "Block failed permanently, stopping run"
                    );
                    self.profiles.mark_not_found(&[item.id])?;
                    self.blocklist.remove(item.id)?;
                    report.halted = Some(item.id);
                    break;
                }
            }
        }

        info!(
            blocked = report.blocked,
            skipped = report.skipped_already_blocked,
            retried = report.retried,
            halted = ?report.halted,
            "Block run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use crate::blocklist::BlockListKind;
    use crate::profile::{ProfileRecord, ProfileStatus, Tombstone};
    use crate::storage::SqliteStore;
    use crate::testing::fixtures::{self, ids_page};
    use crate::testing::{FixedClock, MockApiClient, RecordingSleeper};
    use crate::api::RATE_LIMIT_RESET_HEADER;
    use std::time::Duration;

    struct Harness {
        client: MockApiClient,
        sleeper: RecordingSleeper,
        store: Arc<SqliteStore>,
        executor: BlockExecutor,
    }

    fn harness() -> Harness {
        let client = MockApiClient::new();
        let sleeper = RecordingSleeper::new();
        let clock = FixedClock::new(1_000);
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let executor = BlockExecutor::new(fixtures::context(&client, &sleeper, &clock), store.clone());
        Harness {
            client,
            sleeper,
            store,
            executor,
        }
    }

    fn seed(store: &SqliteStore, ids: &[u64]) {
        let records: Vec<ProfileRecord> = ids
            .iter()
            .map(|id| ProfileRecord::new(*id, format!("user{}", id)))
            .collect();
        store.upsert(&records).unwrap();
        store.add_candidates(ids, BlockListKind::Block).unwrap();
    }

    fn item(id: u64) -> RetryableItem {
        RetryableItem {
            id,
            screen_name: format!("user{}", id),
            retries: 0,
        }
    }

    #[tokio::test]
    async fn test_block_empty_list_is_noop() {
        let h = harness();
        let report = h.executor.block().await.unwrap();
        assert_eq!(report, BlockReport::default());
        assert!(h.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_block_skips_already_blocked() {
        let h = harness();
        seed(&h.store, &[1, 2]);
        h.client.push_json(Endpoint::BlocksIds, ids_page(&[2], "0"));

        let report = h.executor.block().await.unwrap();

        assert_eq!(report.blocked, 1);
        assert_eq!(report.skipped_already_blocked, 1);
        let calls = h.client.requests_to(Endpoint::BlocksCreate);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get_param("user_id"), Some("1"));
        assert_eq!(calls[0].get_param("skip_status"), Some("true"));
        assert_eq!(h.sleeper.sleeps(), vec![Duration::from_millis(250)]);
    }

    #[tokio::test]
    async fn test_block_excludes_tombstoned_profiles() {
        let h = harness();
        seed(&h.store, &[1, 2]);
        h.store.mark_not_found(&[2]).unwrap();

        h.executor.block().await.unwrap();

        let calls = h.client.requests_to(Endpoint::BlocksCreate);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get_param("user_id"), Some("1"));
    }

    #[tokio::test]
    async fn test_rate_limit_retries_same_item_without_counting() {
        let h = harness();
        h.client.push_response(
            Endpoint::BlocksCreate,
            ApiResponse::new(429, "{}").with_header(RATE_LIMIT_RESET_HEADER, "1010"),
        );

        let report = h.executor.perform_block(vec![item(1), item(2)]).await.unwrap();

        assert_eq!(report.blocked, 2);
        assert_eq!(report.retried, 0);
        let order: Vec<_> = h
            .client
            .requests_to(Endpoint::BlocksCreate)
            .iter()
            .map(|r| r.get_param("user_id").unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["1", "1", "2"]);
        assert_eq!(h.sleeper.sleeps()[0], Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_failure_requeues_at_tail() {
        let h = harness();
        h.client.push_response(Endpoint::BlocksCreate, ApiResponse::new(500, "{}"));

        let report = h.executor.perform_block(vec![item(1), item(2)]).await.unwrap();

        assert_eq!(report.blocked, 2);
        assert_eq!(report.retried, 1);
        let order: Vec<_> = h
            .client
            .requests_to(Endpoint::BlocksCreate)
            .iter()
            .map(|r| r.get_param("user_id").unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["1", "2", "1"]);
    }

    #[tokio::test]
    async fn test_exhausted_retries_tombstone_and_halt() {
        let h = harness();
        seed(&h.store, &[1, 2]);
        h.client.set_default(Endpoint::BlocksCreate, ApiResponse::new(403, "{}"));

        let report = h.executor.perform_block(vec![item(1)]).await.unwrap();

        assert_eq!(report.halted, Some(1));
        assert_eq!(report.retried, 3);
        assert_eq!(h.client.requests_to(Endpoint::BlocksCreate).len(), 4);
        assert_eq!(
            h.store.status(1).unwrap(),
            Some(ProfileStatus::Tombstoned(Tombstone::NotFound))
        );
        assert!(!h.store.contains(1, BlockListKind::Block).unwrap());
        assert!(h.store.contains(2, BlockListKind::Block).unwrap());
    }

    #[tokio::test]
    async fn test_halt_stops_remaining_items() {
        let h = harness();
        h.client.set_handler(|request| {
            if request.get_param("user_id") == Some("1") {
                Some(Ok(ApiResponse::new(403, "{}")))
            } else {
                None
            }
        });
        let options = BlockOptions {
            max_retries: 0,
            post_block_delay: Duration::ZERO,
        };
        let executor = BlockExecutor::new(
            fixtures::context(&h.client, &h.sleeper, &FixedClock::new(0)),
            h.store.clone(),
        )
        .with_options(options);

        let report = executor.perform_block(vec![item(1), item(2)]).await.unwrap();

        assert_eq!(report.halted, Some(1));
        assert_eq!(report.blocked, 0);
        assert_eq!(h.client.requests_to(Endpoint::BlocksCreate).len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_requeues_with_backoff() {
        let h = harness();
        h.client
            .push_error(Endpoint::BlocksCreate, ApiError::Transport("reset".to_string()));

        let report = h.executor.perform_block(vec![item(1), item(2)]).await.unwrap();

        assert_eq!(report.blocked, 2);
        assert_eq!(report.retried, 0);
        assert_eq!(h.sleeper.sleeps()[0], Duration::from_secs(1));
        let order: Vec<_> = h
            .client
            .requests_to(Endpoint::BlocksCreate)
            .iter()
            .map(|r| r.get_param("user_id").unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["1", "2", "1"]);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_run() {
        let h = harness();
        h.client.push_error(
            Endpoint::BlocksCreate,
            ApiError::MissingCredentials("no user token".to_string()),
        );

        let result = h.executor.perform_block(vec![item(1)]).await;
        assert!(matches!(result, Err(BlockError::Api(ApiError::MissingCredentials(_)))));
    }

    #[tokio::test]
    async fn test_cancel_during_post_block_delay() {
        let h = harness();
        h.sleeper.cancel_after(0);

        let err = h
            .executor
            .perform_block(vec![item(1), item(2)])
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(h.client.requests_to(Endpoint::BlocksCreate).len(), 1);
    }
}
