//! Request/response types of the platform API seam.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::endpoint::{AuthMode, Endpoint};

/// Header carrying the unix time at which the current rate limit window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// One API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
    pub auth: AuthMode,
}

impl ApiRequest {
    /// Request with the endpoint's default credential.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
            auth: endpoint.spec().auth,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(key, value);
        self
    }

    /// Insert or replace a parameter, keeping its original position.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response; headers are keyed lowercase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Unix seconds from `x-rate-limit-reset`, if present and numeric.
    pub fn rate_limit_reset(&self) -> Option<i64> {
        self.header(RATE_LIMIT_RESET_HEADER)
            .and_then(|v| v.trim().parse::<i64>().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Errors below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection failure, timeout, broken body; always worth retrying.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// No credential available for the requested auth mode.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Issues authenticated requests against the platform.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Perform one request. HTTP error statuses are returned as responses;
    /// only transport level failures are errors.
    async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}
