//! Paginated fetch state machine.
//!
//! Every paged endpoint goes through [`PaginatedFetcher`]. Each response is
//! reduced to a [`Step`] by [`classify`], and only the driving loop in
//! [`PaginatedFetcher::next_page`] sleeps or re-requests.

use std::time::Duration;

use futures::stream::{self, Stream};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiRequest, ApiResponse, Pagination};

use super::backoff::{rate_limit_wait, transport_backoff};
use super::{AbortReason, FetchContext, FetchError, FetchOptions};

/// Where the next request of a paged fetch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// First request, parameters as given.
    Start,
    /// Value of the `cursor` parameter.
    Cursor(String),
    /// Full replacement query taken from `next_results`.
    Query(Vec<(String, String)>),
}

/// Why a request is repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    RateLimited { wait: Duration },
    Transport(String),
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Same request again after a wait.
    Retry(RetryReason),
    /// Page accepted; more pages follow.
    Advance { page: Value, cursor: PageCursor },
    /// Page accepted; it was the last one.
    Done { page: Value },
    Aborted(AbortReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Fetching,
    Done,
    Aborted(AbortReason),
}

/// Reduce a response to a [`Step`]. Pure; `now` is the current unix time.
pub fn classify(
    pagination: Pagination,
    result: Result<ApiResponse, ApiError>,
    now: i64,
    options: &FetchOptions,
) -> Step {
    let response = match result {
        Ok(response) => response,
        Err(ApiError::Transport(message)) => return Step::Retry(RetryReason::Transport(message)),
        Err(ApiError::MissingCredentials(message)) => {
            return Step::Aborted(AbortReason::MissingCredentials(message))
        }
        Err(ApiError::Decode(message)) => return Step::Aborted(AbortReason::Decode(message)),
    };

    match response.status {
        200 => {}
        429 => {
            let wait = rate_limit_wait(
                response.rate_limit_reset(),
                now,
                options.rate_limit_pad_secs,
            );
            return Step::Retry(RetryReason::RateLimited { wait });
        }
        404 => return Step::Aborted(AbortReason::NotFound),
        status => return Step::Aborted(AbortReason::Status(status)),
    }

    let page: Value = match response.json() {
        Ok(page) => page,
        Err(e) => return Step::Aborted(AbortReason::Decode(e.to_string())),
    };

    match next_cursor(pagination, &page) {
        Some(cursor) => Step::Advance { page, cursor },
        None => Step::Done { page },
    }
}

fn next_cursor(pagination: Pagination, page: &Value) -> Option<PageCursor> {
    match pagination {
        Pagination::Single => None,
        Pagination::Cursor => {
            let cursor = match page.get("next_cursor_str").and_then(Value::as_str) {
                Some(s) => s.to_string(),
                None => page.get("next_cursor")?.as_i64()?.to_string(),
            };
            // "0" marks the last page
            if cursor.is_empty() || cursor == "0" {
                None
            } else {
                Some(PageCursor::Cursor(cursor))
            }
        }
        Pagination::NextResults => {
            let next = page
                .get("search_metadata")?
                .get("next_results")?
                .as_str()?;
            let query = parse_query_string(next);
            if query.is_empty() {
                None
            } else {
                Some(PageCursor::Query(query))
            }
        }
    }
}

/// Split `?a=1&b=2` into decoded pairs.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Drives one paged fetch to completion.
pub struct PaginatedFetcher<'a> {
    ctx: &'a FetchContext,
    base: ApiRequest,
    cursor: PageCursor,
    state: FetchState,
    pages: usize,
    transport_failures: u32,
    pending_delay: Option<Duration>,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(ctx: &'a FetchContext, request: ApiRequest) -> Self {
        // cursor endpoints start at -1
        let cursor = match request.endpoint.spec().pagination {
            Pagination::Cursor if request.get_param("cursor").is_none() => {
                PageCursor::Cursor("-1".to_string())
            }
            _ => PageCursor::Start,
        };

        Self {
            ctx,
            base: request,
            cursor,
            state: FetchState::Fetching,
            pages: 0,
            transport_failures: 0,
            pending_delay: None,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    fn current_request(&self) -> ApiRequest {
        match &self.cursor {
            PageCursor::Start => self.base.clone(),
            PageCursor::Cursor(cursor) => {
                let mut request = self.base.clone();
                request.set_param("cursor", cursor.clone());
                request
            }
            PageCursor::Query(query) => ApiRequest {
                endpoint: self.base.endpoint,
                params: query.clone(),
                auth: self.base.auth,
            },
        }
    }

    async fn sleep(&mut self, duration: Duration) -> Result<(), FetchError> {
        if let Err(cancelled) = self.ctx.sleeper.sleep(duration).await {
            self.state = FetchState::Aborted(AbortReason::Cancelled);
            return Err(cancelled.into());
        }
        Ok(())
    }

    /// Next accepted page, or `None` once the fetch is done or aborted.
    ///
    /// Rate limits and transport failures are retried here and never
    /// surface to the caller. The only error is cancellation.
    pub async fn next_page(&mut self) -> Result<Option<Value>, FetchError> {
        loop {
            if self.state != FetchState::Fetching {
                return Ok(None);
            }

            if let Some(delay) = self.pending_delay.take() {
                self.sleep(delay).await?;
            }

            let request = self.current_request();
            let endpoint = request.endpoint;
            let result = self.ctx.client.request(&request).await;
            let step = classify(
                endpoint.spec().pagination,
                result,
                self.ctx.clock.now_unix(),
                &self.ctx.options,
            );

            match step {
                Step::Retry(RetryReason::RateLimited { wait }) => {
                    self.transport_failures = 0;
                    info!(%endpoint, wait_secs = wait.as_secs(), "Rate limited, waiting for reset");
                    self.sleep(wait).await?;
                }
                Step::Retry(RetryReason::Transport(message)) => {
                    self.transport_failures = self.transport_failures.saturating_add(1);
                    let wait =
                        transport_backoff(self.transport_failures, self.ctx.options.transport_backoff_max);
                    warn!(
                        %endpoint,
                        error = %message,
                        attempt = self.transport_failures,
                        wait_secs = wait.as_secs(),
                        "Transport error, retrying"
                    );
                    self.sleep(wait).await?;
                }
                Step::Advance { page, cursor } => {
                    self.transport_failures = 0;
                    self.pages += 1;
                    self.cursor = cursor;
                    if self.ctx.options.enforce_rate_limit {
                        self.pending_delay = endpoint.spec().courtesy_delay;
                    }
                    debug!(%endpoint, page = self.pages, "Page fetched, more to follow");
                    return Ok(Some(page));
                }
                Step::Done { page } => {
                    self.pages += 1;
                    self.state = FetchState::Done;
                    debug!(%endpoint, pages = self.pages, "Fetch complete");
                    return Ok(Some(page));
                }
                Step::Aborted(reason) => {
                    match &reason {
                        AbortReason::NotFound => debug!(%endpoint, "Resource not found"),
                        other => warn!(%endpoint, reason = %other, "Fetch aborted"),
                    }
                    self.state = FetchState::Aborted(reason);
                    return Ok(None);
                }
            }
        }
    }

    /// Lazy stream of pages; ends after the last page or on abort.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value, FetchError>> + 'a {
        stream::unfold(self, |mut fetcher| async move {
            match fetcher.next_page().await {
                Ok(Some(page)) => Some((Ok(page), fetcher)),
                Ok(None) => None,
                Err(e) => Some((Err(e), fetcher)),
            }
        })
    }

    /// Drain the fetch, collecting every id under `key` (`ids` for the id
    /// list endpoints), in page order.
    pub async fn collect_ids(mut self, key: &str) -> Result<IdCollection, FetchError> {
        let mut ids = Vec::new();
        while let Some(page) = self.next_page().await? {
            ids.extend(ids_from_page(&page, key));
        }
        Ok(IdCollection {
            ids,
            state: self.state,
        })
    }
}

/// Ids gathered by [`PaginatedFetcher::collect_ids`] and how the fetch ended.
#[derive(Debug, Clone, PartialEq)]
pub struct IdCollection {
    pub ids: Vec<u64>,
    pub state: FetchState,
}

impl IdCollection {
    pub fn is_complete(&self) -> bool {
        self.state == FetchState::Done
    }
}

/// Ids under `key`, accepting numbers or numeric strings.
pub fn ids_from_page(page: &Value, key: &str) -> Vec<u64> {
    page.get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| match v {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.parse().ok(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
