//! Wait time rules for rate limits and transport failures.

use std::time::Duration;

/// Flat wait when the reset header is missing or already in the past.
pub const RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(5);

/// How long to sleep after a 429.
///
/// `reset` is the unix time from `x-rate-limit-reset`; `pad_secs` is added on
/// top of the remaining window.
pub fn rate_limit_wait(reset: Option<i64>, now: i64, pad_secs: u64) -> Duration {
    match reset {
        Some(reset) if reset >= now => Duration::from_secs((reset - now) as u64 + pad_secs),
        _ => RATE_LIMIT_FALLBACK,
    }
}

/// Capped exponential backoff for the n-th consecutive transport failure
/// (1-based): 1s, 2s, 4s, ... up to `max`.
pub fn transport_backoff(attempt: u32, max: Duration) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    Duration::from_secs(1u64 << exp).min(max)
}
