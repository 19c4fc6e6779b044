//! Deterministic clock and sleeper for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::fetcher::{Cancelled, Clock, Sleeper};

/// Clock frozen at a settable unix time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Sleeper that returns immediately and records every requested duration.
///
/// # Example
///
/// ```rust,ignore
/// let sleeper = RecordingSleeper::new();
/// sleeper.sleep(Duration::from_secs(61)).await?;
/// assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(61)]);
///
/// // third sleep and later fail with Cancelled
/// sleeper.cancel_after(2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<RwLock<Vec<Duration>>>,
    /// Sleeps allowed to succeed before cancellation kicks in.
    cancel_after: Arc<RwLock<Option<usize>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations of the successful sleeps, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.read().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.read().unwrap().iter().sum()
    }

    /// Let `n` more sleeps succeed, then fail every later one.
    pub fn cancel_after(&self, n: usize) {
        let done = self.sleeps.read().unwrap().len();
        *self.cancel_after.write().unwrap() = Some(done + n);
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let mut sleeps = self.sleeps.write().unwrap();
        if let Some(limit) = *self.cancel_after.read().unwrap() {
            if sleeps.len() >= limit {
                return Err(Cancelled);
            }
        }
        sleeps.push(duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(100);
        clock.advance(5);
        assert_eq!(clock.now_unix(), 105);
        clock.set(1);
        assert_eq!(clock.now_unix(), 1);
    }

    #[tokio::test]
    async fn test_recording_sleeper_cancel_after() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(1)).await.unwrap();
        sleeper.cancel_after(1);
        sleeper.sleep(Duration::from_secs(2)).await.unwrap();
        assert_eq!(sleeper.sleep(Duration::from_secs(3)).await, Err(Cancelled));
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert_eq!(sleeper.total(), Duration::from_secs(3));
    }
}
