//! Mock platform API client for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse, Endpoint};

type Scripted = Result<ApiResponse, ApiError>;

/// Handler producing responses dynamically from the request.
type RequestHandler = Box<dyn Fn(&ApiRequest) -> Option<Scripted> + Send + Sync>;

/// Mock implementation of the [`ApiClient`] trait.
///
/// Responses are scripted per endpoint and popped in order. When an
/// endpoint's queue is empty the handler (if any) is asked, then the
/// endpoint default, and finally a `200 {}` is returned. Every request is
/// recorded.
///
/// # Example
///
/// ```rust,ignore
/// use termblock_core::testing::MockApiClient;
///
/// let client = MockApiClient::new();
/// client.push_json(Endpoint::FollowersIds, json!({"ids": [1, 2], "next_cursor_str": "0"}));
///
/// let response = client.request(&ApiRequest::new(Endpoint::FollowersIds)).await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(client.requests().len(), 1);
/// ```
#[derive(Clone)]
pub struct MockApiClient {
    queues: Arc<RwLock<HashMap<Endpoint, VecDeque<Scripted>>>>,
    defaults: Arc<RwLock<HashMap<Endpoint, ApiResponse>>>,
    handler: Arc<RwLock<Option<RequestHandler>>>,
    requests: Arc<RwLock<Vec<ApiRequest>>>,
}

impl std::fmt::Debug for MockApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApiClient")
            .field("queues", &"<queues>")
            .field("defaults", &"<defaults>")
            .field("handler", &"<handler>")
            .field("requests", &self.requests.read().unwrap().len())
            .finish()
    }
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApiClient {
    pub fn new() -> Self {
        Self {
            queues: Arc::new(RwLock::new(HashMap::new())),
            defaults: Arc::new(RwLock::new(HashMap::new())),
            handler: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a raw response for the endpoint.
    pub fn push_response(&self, endpoint: Endpoint, response: ApiResponse) {
        self.push(endpoint, Ok(response));
    }

    /// Queue a `200` JSON response for the endpoint.
    pub fn push_json(&self, endpoint: Endpoint, body: Value) {
        self.push_response(endpoint, ApiResponse::new(200, body.to_string()));
    }

    /// Queue a transport level failure for the endpoint.
    pub fn push_error(&self, endpoint: Endpoint, error: ApiError) {
        self.push(endpoint, Err(error));
    }

    fn push(&self, endpoint: Endpoint, scripted: Scripted) {
        self.queues
            .write()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(scripted);
    }

    /// Response returned for the endpoint once its queue is drained.
    pub fn set_default(&self, endpoint: Endpoint, response: ApiResponse) {
        self.defaults.write().unwrap().insert(endpoint, response);
    }

    /// Set a handler consulted when an endpoint's queue is empty.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&ApiRequest) -> Option<Result<ApiResponse, ApiError>> + Send + Sync + 'static,
    {
        *self.handler.write().unwrap() = Some(Box::new(handler));
    }

    /// All requests made so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Requests made to one endpoint.
    pub fn requests_to(&self, endpoint: Endpoint) -> Vec<ApiRequest> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Number of scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.queues.read().unwrap().values().map(VecDeque::len).sum()
    }

    pub fn clear_requests(&self) {
        self.requests.write().unwrap().clear();
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.write().unwrap().push(request.clone());

        let scripted = self
            .queues
            .write()
            .unwrap()
            .get_mut(&request.endpoint)
            .and_then(VecDeque::pop_front);
        if let Some(scripted) = scripted {
            return scripted;
        }

        if let Some(handler) = self.handler.read().unwrap().as_ref() {
            if let Some(result) = handler(request) {
                return result;
            }
        }

        if let Some(response) = self.defaults.read().unwrap().get(&request.endpoint) {
            return Ok(response.clone());
        }

        Ok(ApiResponse::new(200, "{}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_then_default() {
        let client = MockApiClient::new();
        client.push_json(Endpoint::BlocksIds, json!({"ids": [1]}));
        client.set_default(Endpoint::BlocksIds, ApiResponse::new(404, ""));

        let request = ApiRequest::new(Endpoint::BlocksIds);
        assert_eq!(client.request(&request).await.unwrap().status, 200);
        assert_eq!(client.request(&request).await.unwrap().status, 404);
        assert_eq!(client.request(&request).await.unwrap().status, 404);
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_queues_are_per_endpoint() {
        let client = MockApiClient::new();
        client.push_response(Endpoint::UsersShow, ApiResponse::new(429, ""));

        let other = client
            .request(&ApiRequest::new(Endpoint::UsersLookup))
            .await
            .unwrap();
        assert_eq!(other.status, 200);
        assert_eq!(other.body, "{}");
        assert_eq!(client.pending(), 1);
    }

    #[tokio::test]
    async fn test_handler_sees_params() {
        let client = MockApiClient::new();
        client.set_handler(|request| {
            request
                .get_param("user_id")
                .map(|id| Ok(ApiResponse::new(200, format!("{{\"id_str\":\"{}\"}}", id))))
        });

        let response = client
            .request(&ApiRequest::new(Endpoint::UsersShow).param("user_id", "7"))
            .await
            .unwrap();
        assert_eq!(response.body, r#"{"id_str":"7"}"#);
        assert_eq!(client.requests_to(Endpoint::UsersShow).len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let client = MockApiClient::new();
        client.push_error(Endpoint::BlocksCreate, ApiError::Transport("down".to_string()));
        let result = client.request(&ApiRequest::new(Endpoint::BlocksCreate)).await;
        assert_eq!(result, Err(ApiError::Transport("down".to_string())));
    }
}
