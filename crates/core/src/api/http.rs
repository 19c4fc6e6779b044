//! reqwest-backed [`ApiClient`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ApiConfig;

use super::endpoint::{AuthMode, HttpMethod};
use super::types::{ApiClient, ApiError, ApiRequest, ApiResponse};

/// HTTP client sending bearer credentials.
///
/// Request signing is not performed here; tokens are opaque bearer strings.
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    app_token: Option<String>,
    user_token: Option<String>,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_token: config.app_token.clone().filter(|t| !t.is_empty()),
            user_token: None,
        })
    }

    /// Use this token for [`AuthMode::User`] requests.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = Some(token.into());
        self
    }

    pub fn set_user_token(&mut self, token: impl Into<String>) {
        self.user_token = Some(token.into());
    }

    fn token_for(&self, auth: AuthMode) -> Result<&str, ApiError> {
        let token = match auth {
            // fall back to the user token when no app token is configured
            AuthMode::App => self.app_token.as_deref().or(self.user_token.as_deref()),
            AuthMode::User => self.user_token.as_deref(),
        };
        token.ok_or_else(|| ApiError::MissingCredentials(format!("{:?} token", auth)))
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let spec = request.endpoint.spec();
        let token = self.token_for(request.auth)?;
        let url = self.build_url(spec.path);

        debug!(endpoint = %request.endpoint, params = request.params.len(), "API request");

        let builder = match spec.method {
            HttpMethod::Get => self.client.get(&url).query(&request.params),
            HttpMethod::Post => self.client.post(&url).form(&request.params),
        };

        let response = builder
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Transport(format!("timeout: {}", e))
                } else {
                    ApiError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;

    fn config() -> ApiConfig {
        ApiConfig {
            base_url: "http://localhost:9999/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client = HttpApiClient::new(&config()).unwrap();
        assert_eq!(
            client.build_url("/1.1/blocks/ids.json"),
            "http://localhost:9999/1.1/blocks/ids.json"
        );
    }

    #[test]
    fn test_missing_user_token() {
        let client = HttpApiClient::new(&config()).unwrap();
        assert!(matches!(
            client.token_for(AuthMode::User),
            Err(ApiError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_app_mode_falls_back_to_user_token() {
        let client = HttpApiClient::new(&config()).unwrap().with_user_token("user");
        assert_eq!(client.token_for(AuthMode::App).unwrap(), "user");

        let mut with_app = config();
        with_app.app_token = Some("app".to_string());
        let client = HttpApiClient::new(&with_app).unwrap().with_user_token("user");
        assert_eq!(client.token_for(AuthMode::App).unwrap(), "app");
        assert_eq!(client.token_for(AuthMode::User).unwrap(), "user");
    }

    #[tokio::test]
    async fn test_request_without_credentials_fails_before_network() {
        let client = HttpApiClient::new(&config()).unwrap();
        let result = client
            .request(&ApiRequest::new(Endpoint::BlocksIds))
            .await;
        assert!(matches!(result, Err(ApiError::MissingCredentials(_))));
    }
}
