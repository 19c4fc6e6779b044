use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wordlist::QuotePolicy;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub wordlist: WordlistConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub block: BlockConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Platform API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g., "https://api.twitter.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Bearer token for app-only endpoints (search, retweeters)
    #[serde(default)]
    pub app_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            app_token: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_user_agent() -> String {
    format!("termblock/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("termblock.db")
}

/// Wordlist configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WordlistConfig {
    /// TOML (`terms = [...]`) or JSON (top-level array) file
    #[serde(default = "default_wordlist_path")]
    pub path: PathBuf,
    /// What quotes and pipes become during normalization
    #[serde(default)]
    pub quotes: QuotePolicy,
    /// Let an ALL group collect its members from different fields
    #[serde(default = "default_true")]
    pub groups_span_fields: bool,
}

impl Default for WordlistConfig {
    fn default() -> Self {
        Self {
            path: default_wordlist_path(),
            quotes: QuotePolicy::default(),
            groups_span_fields: true,
        }
    }
}

fn default_wordlist_path() -> PathBuf {
    PathBuf::from("wordlist.toml")
}

fn default_true() -> bool {
    true
}

/// Pagination and rate limit behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Sleep the per-endpoint courtesy delay between pages
    #[serde(default = "default_true")]
    pub enforce_rate_limit: bool,
    /// Seconds added on top of the reset time after a 429
    #[serde(default = "default_rate_limit_pad")]
    pub rate_limit_pad_secs: u64,
    /// Upper bound of the transport error backoff
    #[serde(default = "default_transport_backoff_max")]
    pub transport_backoff_max_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enforce_rate_limit: true,
            rate_limit_pad_secs: default_rate_limit_pad(),
            transport_backoff_max_secs: default_transport_backoff_max(),
        }
    }
}

fn default_rate_limit_pad() -> u64 {
    5
}

fn default_transport_backoff_max() -> u64 {
    60
}

/// Block runner configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockConfig {
    /// Retries per candidate before the run halts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Pause after every successful block call
    #[serde(default = "default_post_block_delay")]
    pub post_block_delay_ms: u64,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            post_block_delay_ms: default_post_block_delay(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_post_block_delay() -> u64 {
    250
}

/// Polling daemon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    /// Sleep when no work is pending
    #[serde(default = "default_idle_sleep")]
    pub idle_sleep_secs: u64,
    /// Pause after each finished follow scan
    #[serde(default = "default_idle_sleep")]
    pub scan_follow_pause_secs: u64,
    /// Profiles per users/lookup request (API maximum: 100)
    #[serde(default = "default_lookup_batch")]
    pub lookup_batch_size: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            idle_sleep_secs: default_idle_sleep(),
            scan_follow_pause_secs: default_idle_sleep(),
            lookup_batch_size: default_lookup_batch(),
        }
    }
}

fn default_idle_sleep() -> u64 {
    60
}

fn default_lookup_batch() -> usize {
    100
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level ladder, `None` silences everything.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    None,
    Debug,
    #[default]
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LogLevel {
    /// The matching `tracing` filter directive.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Debug => "debug",
            LogLevel::Info | LogLevel::Notice => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical | LogLevel::Alert | LogLevel::Emergency => {
                "error"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub database: DatabaseConfig,
    pub wordlist: WordlistConfig,
    pub fetch: FetchConfig,
    pub block: BlockConfig,
    pub daemon: DaemonConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub app_token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                user_agent: config.api.user_agent.clone(),
                timeout_secs: config.api.timeout_secs,
                app_token_configured: config
                    .api
                    .app_token
                    .as_ref()
                    .map(|t| !t.is_empty())
                    .unwrap_or(false),
            },
            database: config.database.clone(),
            wordlist: config.wordlist.clone(),
            fetch: config.fetch.clone(),
            block: config.block.clone(),
            daemon: config.daemon.clone(),
            logging: config.logging.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "https://api.twitter.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.database.path.to_str().unwrap(), "termblock.db");
        assert_eq!(config.wordlist.path.to_str().unwrap(), "wordlist.toml");
        assert_eq!(config.wordlist.quotes, QuotePolicy::Remove);
        assert!(config.wordlist.groups_span_fields);
        assert!(config.fetch.enforce_rate_limit);
        assert_eq!(config.fetch.rate_limit_pad_secs, 5);
        assert_eq!(config.block.max_retries, 3);
        assert_eq!(config.block.post_block_delay_ms, 250);
        assert_eq!(config.daemon.idle_sleep_secs, 60);
        assert_eq!(config.daemon.lookup_batch_size, 100);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_custom_sections() {
        let toml = r#"
[api]
base_url = "http://localhost:8080"
app_token = "app-secret"

[wordlist]
path = "/etc/termblock/terms.json"
quotes = "space"
groups_span_fields = false

[fetch]
enforce_rate_limit = false

[block]
max_retries = 5

[logging]
level = "warning"
format = "json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.app_token.as_deref(), Some("app-secret"));
        assert_eq!(config.wordlist.quotes, QuotePolicy::Space);
        assert!(!config.wordlist.groups_span_fields);
        assert!(!config.fetch.enforce_rate_limit);
        assert_eq!(config.block.max_retries, 5);
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_level_fails() {
        let toml = r#"
[logging]
level = "verbose"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_ordering_and_filters() {
        assert!(LogLevel::None < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Notice < LogLevel::Warning);
        assert!(LogLevel::Alert < LogLevel::Emergency);

        assert_eq!(LogLevel::None.as_filter(), "off");
        assert_eq!(LogLevel::Notice.as_filter(), "info");
        assert_eq!(LogLevel::Warning.as_filter(), "warn");
        assert_eq!(LogLevel::Critical.as_filter(), "error");
    }

    #[test]
    fn test_sanitized_config_hides_app_token() {
        let mut config = Config::default();
        config.api.app_token = Some("very-secret".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api.app_token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
    }

    #[test]
    fn test_sanitized_config_without_token() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(!sanitized.api.app_token_configured);
    }
}
