//! Profile scan integration tests.
//!
//! A word list file is loaded from disk, stubs are hydrated through a mocked
//! `users/lookup`, matched, listed and finally blocked.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use termblock_core::{
    api::Endpoint,
    config::WordlistConfig,
    load_matcher,
    testing::{fixtures, FixedClock, MockApiClient, RecordingSleeper},
    BlockExecutor, BlockListKind, BlocklistStore, FileWordlistSource, ProfileCollector, ProfileStatus,
    ProfileStore, SqliteStore,
};

const WORDLIST: &str = r#"
terms = [
    "super straight",
    ["🟧", "⬛️"],
]
"#;

struct TestHarness {
    client: MockApiClient,
    sleeper: RecordingSleeper,
    clock: FixedClock,
    store: Arc<SqliteStore>,
    collector: ProfileCollector,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let wordlist_path: PathBuf = temp_dir.path().join("wordlist.toml");
        std::fs::write(&wordlist_path, WORDLIST).expect("Failed to write wordlist");

        let config = WordlistConfig {
            path: wordlist_path.clone(),
            ..Default::default()
        };
        let matcher = load_matcher(&FileWordlistSource::new(wordlist_path), &config)
            .expect("Failed to load wordlist");

        let store = Arc::new(
            SqliteStore::new(&temp_dir.path().join("test.db")).expect("Failed to create store"),
        );
        let client = MockApiClient::new();
        let sleeper = RecordingSleeper::new();
        let clock = FixedClock::new(1_700_000_000);
        let collector = ProfileCollector::new(
            fixtures::context(&client, &sleeper, &clock),
            matcher,
            store.clone(),
        );

        Self {
            client,
            sleeper,
            clock,
            store,
            collector,
            temp_dir,
        }
    }

    fn lookup_response() -> serde_json::Value {
        let mut profile_b = fixtures::user(2, "profile_b", "⬛️ person");
        profile_b["name"] = json!("🟧");
        json!([
            fixtures::user(1, "profile_a", "I'm Super Straight and proud"),
            profile_b,
            fixtures::user(3, "profile_c", "nothing relevant"),
        ])
    }
}

#[tokio::test]
async fn test_lookup_flags_any_term_and_emoji_group() {
    let h = TestHarness::new();
    h.store.insert_ids(&[1, 2, 3]).unwrap();
    h.client
        .push_json(Endpoint::UsersLookup, TestHarness::lookup_response());

    let report = h.collector.fetch_profiles().await.unwrap();

    assert_eq!(report.profiles_seen, 3);
    assert_eq!(report.candidates, 2);
    assert!(h.store.contains(1, BlockListKind::Block).unwrap());
    assert!(h.store.contains(2, BlockListKind::Block).unwrap());
    assert!(!h.store.contains(3, BlockListKind::Block).unwrap());
    assert!(matches!(h.store.status(3).unwrap(), Some(ProfileStatus::Scanned(_))));
}

#[tokio::test]
async fn test_flagged_profiles_are_blocked() {
    let h = TestHarness::new();
    h.store.insert_ids(&[1, 2, 3]).unwrap();
    h.client
        .push_json(Endpoint::UsersLookup, TestHarness::lookup_response());
    h.collector.fetch_profiles().await.unwrap();

    let executor = BlockExecutor::new(
        fixtures::context(&h.client, &h.sleeper, &h.clock),
        h.store.clone(),
    );
    let report = executor.block().await.unwrap();

    assert_eq!(report.blocked, 2);
    assert_eq!(report.halted, None);

    let blocked: Vec<_> = h
        .client
        .requests_to(Endpoint::BlocksCreate)
        .iter()
        .map(|r| r.get_param("user_id").unwrap().to_string())
        .collect();
    assert_eq!(blocked, vec!["1", "2"]);
}

#[tokio::test]
async fn test_never_list_is_excluded_from_scans() {
    let h = TestHarness::new();
    h.store.insert_ids(&[1]).unwrap();
    h.store.add_candidates(&[1], BlockListKind::Never).unwrap();
    h.client.push_json(
        Endpoint::UsersLookup,
        json!([fixtures::user(1, "profile_a", "super straight")]),
    );

    h.collector.fetch_profiles().await.unwrap();
    let report = h.collector.scan_by_wordlist().unwrap();

    assert_eq!(report.listed, 0);
    assert!(h.store.pending_blocks().unwrap().is_empty());
}

#[tokio::test]
async fn test_wordlist_edit_applies_after_reload() {
    let mut h = TestHarness::new();
    let path = h.temp_dir.path().join("wordlist.toml");
    std::fs::write(&path, "terms = [\"nothing relevant\"]").unwrap();

    let config = WordlistConfig {
        path: path.clone(),
        ..Default::default()
    };
    let reloaded = load_matcher(&FileWordlistSource::new(path), &config).unwrap();
    h.collector.set_matcher(reloaded);

    h.store.insert_ids(&[1, 2, 3]).unwrap();
    h.client
        .push_json(Endpoint::UsersLookup, TestHarness::lookup_response());
    h.collector.fetch_profiles().await.unwrap();

    assert!(!h.store.contains(1, BlockListKind::Block).unwrap());
    assert!(h.store.contains(3, BlockListKind::Block).unwrap());
}
