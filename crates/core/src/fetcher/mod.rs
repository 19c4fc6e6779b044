//! Rate-limit aware request execution.

mod backoff;
mod clock;
mod paginator;

pub use backoff::{rate_limit_wait, transport_backoff, RATE_LIMIT_FALLBACK};
pub use clock::{Cancelled, Clock, Shutdown, Sleeper, SystemClock, TokioSleeper};
pub use paginator::{
    classify, ids_from_page, parse_query_string, FetchState, IdCollection, PageCursor,
    PaginatedFetcher, RetryReason, Step,
};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiClient, ApiRequest};
use crate::config::FetchConfig;

/// Why a fetch stopped before its last page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("resource not found")]
    NotFound,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("undecodable response: {0}")]
    Decode(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetch cancelled by shutdown")]
    Cancelled,

    #[error("Resource not found")]
    NotFound,

    #[error("Fetch aborted: {0}")]
    Aborted(AbortReason),
}

impl From<Cancelled> for FetchError {
    fn from(_: Cancelled) -> Self {
        FetchError::Cancelled
    }
}

impl From<AbortReason> for FetchError {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::NotFound => FetchError::NotFound,
            AbortReason::Cancelled => FetchError::Cancelled,
            other => FetchError::Aborted(other),
        }
    }
}

/// Knobs of the fetch loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Sleep the endpoint's courtesy delay between pages.
    pub enforce_rate_limit: bool,
    pub rate_limit_pad_secs: u64,
    pub transport_backoff_max: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            enforce_rate_limit: config.enforce_rate_limit,
            rate_limit_pad_secs: config.rate_limit_pad_secs,
            transport_backoff_max: Duration::from_secs(config.transport_backoff_max_secs.max(1)),
        }
    }
}

/// Shared handles every fetch needs.
#[derive(Clone)]
pub struct FetchContext {
    pub client: Arc<dyn ApiClient>,
    pub sleeper: Arc<dyn Sleeper>,
    pub clock: Arc<dyn Clock>,
    pub options: FetchOptions,
}

impl FetchContext {
    pub fn new(
        client: Arc<dyn ApiClient>,
        sleeper: Arc<dyn Sleeper>,
        clock: Arc<dyn Clock>,
        options: FetchOptions,
    ) -> Self {
        Self {
            client,
            sleeper,
            clock,
            options,
        }
    }

    /// Sleep on the shared sleeper.
    pub async fn sleep(&self, duration: Duration) -> Result<(), FetchError> {
        self.sleeper.sleep(duration).await.map_err(FetchError::from)
    }

    /// Run a single-page request with the same retry rules as paged fetches.
    pub async fn fetch_single(&self, request: ApiRequest) -> Result<Value, FetchError> {
        let mut fetcher = PaginatedFetcher::new(self, request);
        match fetcher.next_page().await? {
            Some(page) => Ok(page),
            None => match fetcher.state() {
                FetchState::Aborted(reason) => Err(reason.clone().into()),
                // a Single fetch always yields its page or aborts
                _ => Err(FetchError::Aborted(AbortReason::Decode(
                    "empty response".to_string(),
                ))),
            },
        }
    }

    /// All ids of a cursor endpoint.
    pub async fn collect_ids(&self, request: ApiRequest) -> Result<IdCollection, FetchError> {
        PaginatedFetcher::new(self, request).collect_ids("ids").await
    }
}
