//! Time seams: wall clock, interruptible sleeps and the shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// A sleep was interrupted by shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Operation cancelled by shutdown")]
pub struct Cancelled;

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Every backoff, courtesy delay and idle wait goes through this.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled>;
}

/// Owner side of the shutdown signal. Clones trigger the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Wake every pending sleep with [`Cancelled`].
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn sleeper(&self) -> TokioSleeper {
        TokioSleeper {
            shutdown: self.tx.subscribe(),
        }
    }
}

/// Real sleeper that can be cut short by [`Shutdown::trigger`].
#[derive(Debug, Clone)]
pub struct TokioSleeper {
    shutdown: watch::Receiver<bool>,
}

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let mut rx = self.shutdown.clone();
        if *rx.borrow() {
            return Err(Cancelled);
        }

        let deadline = Instant::now() + duration;
        let cancelled = tokio::select! {
            _ = sleep_until(deadline) => false,
            res = rx.wait_for(|triggered| *triggered) => res.is_ok(),
        };

        if cancelled {
            return Err(Cancelled);
        }

        // the sender may be gone; finish the sleep regardless
        sleep_until(deadline).await;
        Ok(())
    }
}
