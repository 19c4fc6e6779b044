//! Conversion of platform user objects (v1.1 and v2 shapes) into records.

use chrono::DateTime;
use serde_json::Value;

use crate::wordlist::collapse_whitespace;

use super::types::ProfileRecord;
use super::ProfileError;

/// `created_at` format of v1.1 user objects, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const V1_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parse one user object.
///
/// Text fields get whitespace runs collapsed. Counts default to 0, the
/// verified flag to false and an unparseable creation date to 0.
pub fn parse_user(user: &Value) -> Result<ProfileRecord, ProfileError> {
    let id = parse_id(user).ok_or(ProfileError::MissingId)?;

    let text = |key: &str| collapse_whitespace(user.get(key).and_then(Value::as_str).unwrap_or(""));

    let screen_name = user
        .get("screen_name")
        .or_else(|| user.get("username"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let metric = |v1: &str, v2: &str| {
        user.get(v1)
            .and_then(Value::as_u64)
            .or_else(|| user.pointer(&format!("/public_metrics/{}", v2)).and_then(Value::as_u64))
            .unwrap_or(0)
    };

    Ok(ProfileRecord {
        id,
        screen_name,
        name: text("name"),
        description: text("description"),
        location: text("location"),
        followers_count: metric("followers_count", "followers_count"),
        friends_count: metric("friends_count", "following_count"),
        created_at: user
            .get("created_at")
            .and_then(Value::as_str)
            .map(parse_created_at)
            .unwrap_or(0),
        verified: parse_flag(user.get("verified")),
    })
}

/// Id from `id_str`, falling back to `id` (number or string).
pub fn parse_id(user: &Value) -> Option<u64> {
    user.get("id_str")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .or_else(|| match user.get("id")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
}

/// Unix seconds of a v1.1 or RFC 3339 date; 0 when unparseable.
pub fn parse_created_at(raw: &str) -> i64 {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, V1_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

fn parse_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Whether the account's tweets are protected.
pub fn is_protected(user: &Value) -> bool {
    parse_flag(user.get("protected"))
}
