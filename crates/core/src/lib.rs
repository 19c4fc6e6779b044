pub mod api;
pub mod blocker;
pub mod blocklist;
pub mod collector;
pub mod config;
pub mod fetcher;
pub mod profile;
pub mod scan;
pub mod storage;
pub mod testing;
pub mod token;
pub mod wordlist;

pub use api::{
    is_valid_screen_name, parse_status_url, ApiClient, ApiError, ApiRequest, ApiResponse, Endpoint,
    HttpApiClient, StatusTarget,
};
pub use blocker::{BlockError, BlockExecutor, BlockOptions, BlockReport, RetryableItem};
pub use blocklist::{BlockCandidateSet, BlockListKind, BlocklistEntry, BlocklistStore, PendingBlock};
pub use collector::{CollectError, CollectOptions, CollectReport, ProfileCollector, ScanOutcome};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat, LogLevel,
    SanitizedConfig,
};
pub use fetcher::{
    Clock, FetchContext, FetchError, FetchOptions, PaginatedFetcher, Shutdown, Sleeper, SystemClock,
    TokioSleeper,
};
pub use profile::{ProfileRecord, ProfileStatus, ProfileStore, Tombstone};
pub use scan::{ScanJob, ScanJobStore, ScanStatus};
pub use storage::{SqliteStore, StoreError};
pub use token::{verify_token, HexCipher, Identity, TokenCipher, TokenError, TokenStore};
pub use wordlist::{
    load_matcher, FileWordlistSource, Matcher, Normalizer, QuotePolicy, RawTerm, TermIndex,
    WordlistError, WordlistSource,
};
