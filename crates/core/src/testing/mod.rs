//! Testing utilities: a scripted API client, a frozen clock and a recording
//! sleeper, so fetch logic runs in tests without network or real waits.
//!
//! # Example
//!
//! ```rust,ignore
//! use termblock_core::testing::{fixtures, FixedClock, MockApiClient, RecordingSleeper};
//!
//! let client = MockApiClient::new();
//! client.push_json(Endpoint::UsersShow, fixtures::user(42, "someone", "bio"));
//!
//! let ctx = fixtures::context(&client, &RecordingSleeper::new(), &FixedClock::new(0));
//! ```

mod mock_api_client;
mod mock_time;

pub use mock_api_client::MockApiClient;
pub use mock_time::{FixedClock, RecordingSleeper};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::{FixedClock, MockApiClient, RecordingSleeper};
    use crate::fetcher::{FetchContext, FetchOptions};
    use crate::wordlist::{Matcher, Normalizer, RawTerm, TermIndex};

    /// A v1 user object.
    pub fn user(id: u64, screen_name: &str, description: &str) -> Value {
        json!({
            "id": id,
            "id_str": id.to_string(),
            "screen_name": screen_name,
            "name": screen_name.to_uppercase(),
            "description": description,
            "location": "",
            "followers_count": 10,
            "friends_count": 20,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "verified": false,
            "protected": false
        })
    }

    pub fn protected_user(id: u64, screen_name: &str) -> Value {
        let mut user = user(id, screen_name, "");
        user["protected"] = json!(true);
        user
    }

    /// A tweet by `author`, optionally replying to `reply_to`.
    pub fn tweet(id: u64, author: Value, reply_to: Option<&str>) -> Value {
        json!({
            "id_str": id.to_string(),
            "text": "some text",
            "in_reply_to_status_id_str": reply_to,
            "user": author
        })
    }

    /// A cursor page of ids. `next_cursor` "0" ends pagination.
    pub fn ids_page(ids: &[u64], next_cursor: &str) -> Value {
        json!({ "ids": ids, "next_cursor_str": next_cursor })
    }

    /// A cursor page of list members.
    pub fn users_page(users: Vec<Value>, next_cursor: &str) -> Value {
        json!({ "users": users, "next_cursor_str": next_cursor })
    }

    /// A search page; `next_results` is omitted on the last page.
    pub fn search_page(statuses: Vec<Value>, next_results: Option<&str>) -> Value {
        match next_results {
            Some(next) => json!({ "statuses": statuses, "search_metadata": { "next_results": next } }),
            None => json!({ "statuses": statuses, "search_metadata": {} }),
        }
    }

    /// Matcher over the given terms with default policies.
    pub fn matcher(terms: Vec<RawTerm>) -> Matcher {
        let normalizer = Normalizer::default();
        Matcher::new(TermIndex::build(terms, &normalizer), normalizer)
    }

    /// Fetch context over test doubles with default options.
    pub fn context(client: &MockApiClient, sleeper: &RecordingSleeper, clock: &FixedClock) -> FetchContext {
        FetchContext::new(
            Arc::new(client.clone()),
            Arc::new(sleeper.clone()),
            Arc::new(clock.clone()),
            FetchOptions::default(),
        )
    }
}
