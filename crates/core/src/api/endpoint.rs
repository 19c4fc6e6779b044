//! Fixed table of the platform endpoints the scanner talks to.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which credential a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Application-only token (better limits on search/retweeters).
    App,
    /// Token of the authenticated account.
    User,
}

/// How an endpoint continues onto the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `cursor` request parameter, `next_cursor_str` in the response.
    Cursor,
    /// `search_metadata.next_results` query string.
    NextResults,
    /// One request, one page.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Static description of an endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    pub method: HttpMethod,
    pub path: &'static str,
    pub pagination: Pagination,
    /// Pause between pages while rate limit enforcement is on.
    pub courtesy_delay: Option<Duration>,
    pub auth: AuthMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    BlocksIds,
    FollowersIds,
    FriendsIds,
    RetweetersIds,
    SearchTweets,
    ListsMembers,
    ListsList,
    UsersShow,
    UsersLookup,
    VerifyCredentials,
    BlocksCreate,
}

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Endpoint::BlocksIds,
        Endpoint::FollowersIds,
        Endpoint::FriendsIds,
        Endpoint::RetweetersIds,
        Endpoint::SearchTweets,
        Endpoint::ListsMembers,
        Endpoint::ListsList,
        Endpoint::UsersShow,
        Endpoint::UsersLookup,
        Endpoint::VerifyCredentials,
        Endpoint::BlocksCreate,
    ];

    pub fn spec(&self) -> EndpointSpec {
        use HttpMethod::{Get, Post};
        use Pagination::{Cursor, NextResults, Single};

        // 15 requests per 15 minutes for the id lists
        let id_list_delay = Some(Duration::from_secs(61));

        match self {
            Endpoint::BlocksIds => spec(Get, "/1.1/blocks/ids.json", Cursor, id_list_delay, AuthMode::User),
            Endpoint::FollowersIds => spec(Get, "/1.1/followers/ids.json", Cursor, id_list_delay, AuthMode::User),
            Endpoint::FriendsIds => spec(Get, "/1.1/friends/ids.json", Cursor, id_list_delay, AuthMode::User),
            Endpoint::RetweetersIds => spec(
                Get,
                "/1.1/statuses/retweeters/ids.json",
                Cursor,
                Some(Duration::from_secs(3)),
                AuthMode::App,
            ),
            // 450 requests per 15 minutes
            Endpoint::SearchTweets => spec(
                Get,
                "/1.1/search/tweets.json",
                NextResults,
                Some(Duration::from_millis(2100)),
                AuthMode::App,
            ),
            Endpoint::ListsMembers => spec(Get, "/1.1/lists/members.json", Cursor, None, AuthMode::User),
            Endpoint::ListsList => spec(Get, "/1.1/lists/list.json", Single, None, AuthMode::User),
            Endpoint::UsersShow => spec(Get, "/1.1/users/show.json", Single, None, AuthMode::User),
            Endpoint::UsersLookup => spec(Get, "/1.1/users/lookup.json", Single, None, AuthMode::User),
            Endpoint::VerifyCredentials => spec(
                Get,
                "/1.1/account/verify_credentials.json",
                Single,
                None,
                AuthMode::User,
            ),
            Endpoint::BlocksCreate => spec(Post, "/1.1/blocks/create.json", Single, None, AuthMode::User),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::BlocksIds => "blocks_ids",
            Endpoint::FollowersIds => "followers_ids",
            Endpoint::FriendsIds => "friends_ids",
            Endpoint::RetweetersIds => "retweeters_ids",
            Endpoint::SearchTweets => "search_tweets",
            Endpoint::ListsMembers => "lists_members",
            Endpoint::ListsList => "lists_list",
            Endpoint::UsersShow => "users_show",
            Endpoint::UsersLookup => "users_lookup",
            Endpoint::VerifyCredentials => "verify_credentials",
            Endpoint::BlocksCreate => "blocks_create",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn spec(
    method: HttpMethod,
    path: &'static str,
    pagination: Pagination,
    courtesy_delay: Option<Duration>,
    auth: AuthMode,
) -> EndpointSpec {
    EndpointSpec {
        method,
        path,
        pagination,
        courtesy_delay,
        auth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique() {
        let paths: HashSet<&str> = Endpoint::ALL.iter().map(|e| e.spec().path).collect();
        assert_eq!(paths.len(), Endpoint::ALL.len());
    }

    #[test]
    fn test_id_lists_use_cursor_and_long_delay() {
        for endpoint in [Endpoint::BlocksIds, Endpoint::FollowersIds, Endpoint::FriendsIds] {
            let spec = endpoint.spec();
            assert_eq!(spec.pagination, Pagination::Cursor);
            assert_eq!(spec.courtesy_delay, Some(Duration::from_secs(61)));
            assert_eq!(spec.auth, AuthMode::User);
        }
    }

    #[test]
    fn test_app_auth_endpoints() {
        assert_eq!(Endpoint::RetweetersIds.spec().auth, AuthMode::App);
        assert_eq!(Endpoint::SearchTweets.spec().auth, AuthMode::App);
        assert_eq!(
            Endpoint::SearchTweets.spec().pagination,
            Pagination::NextResults
        );
    }

    #[test]
    fn test_block_create_is_post() {
        assert_eq!(Endpoint::BlocksCreate.spec().method, HttpMethod::Post);
        assert_eq!(Endpoint::BlocksCreate.to_string(), "blocks_create");
    }
}
