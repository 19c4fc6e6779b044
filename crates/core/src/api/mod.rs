//! Platform REST API abstraction.
//!
//! The [`ApiClient`] trait is the only way the core talks to the platform.
//! [`HttpApiClient`] implements it over reqwest; tests use
//! `testing::MockApiClient`.

mod endpoint;
mod http;
mod target;
mod types;

pub use endpoint::{AuthMode, Endpoint, EndpointSpec, HttpMethod, Pagination};
pub use http::HttpApiClient;
pub use target::{is_valid_screen_name, parse_status_url, StatusTarget};
pub use types::{ApiClient, ApiError, ApiRequest, ApiResponse, RATE_LIMIT_RESET_HEADER};
