//! Polling loops for the cron style commands.
//!
//! The word list is reloaded on every iteration. Loops end on shutdown;
//! failed steps are logged and retried after the idle sleep.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info};

use termblock_core::{CollectError, FetchContext};

use crate::state::AppState;

/// What one iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Worked,
    Idle,
    Stop,
}

fn tick_from(result: Result<bool, CollectError>) -> Tick {
    match result {
        Ok(true) => Tick::Worked,
        Ok(false) => Tick::Idle,
        Err(e) if e.is_cancelled() => Tick::Stop,
        Err(e) => {
            error!(error = %e, "Step failed");
            Tick::Idle
        }
    }
}

async fn run_loop<F, Fut>(state: &AppState, ctx: FetchContext, once: bool, mut step: F) -> Result<()>
where
    F: FnMut(termblock_core::ProfileCollector) -> Fut,
    Fut: std::future::Future<Output = Result<bool, CollectError>>,
{
    let idle = Duration::from_secs(state.config().daemon.idle_sleep_secs);

    loop {
        let tick = match state.collector(ctx.clone()) {
            Ok(collector) => tick_from(step(collector).await),
            Err(e) => {
                error!(error = %e, "Could not prepare collector");
                Tick::Idle
            }
        };

        if tick == Tick::Stop || once {
            break;
        }

        if tick == Tick::Idle {
            debug!(secs = idle.as_secs(), "Idle");
            if ctx.sleep(idle).await.is_err() {
                break;
            }
        }
    }

    info!("Daemon stopped");
    Ok(())
}

pub async fn fetch_profiles(state: &AppState, as_user: Option<&str>, once: bool) -> Result<()> {
    let (ctx, _) = state.user_context(as_user)?;
    info!("Profile fetch daemon started");

    run_loop(state, ctx, once, |collector| async move {
        let report = collector.fetch_profiles().await?;
        Ok(report.pages > 0)
    })
    .await
}

pub async fn scan_follow(state: &AppState, as_user: Option<&str>, once: bool) -> Result<()> {
    let (ctx, _) = state.user_context(as_user)?;
    info!("Follow scan daemon started");

    run_loop(state, ctx, once, |collector| async move {
        match collector.scan_follow().await? {
            Some(outcome) => {
                info!(
                    screen_name = %outcome.job.screen_name,
                    status = ?outcome.job.status,
                    ids = outcome.report.ids_seen,
                    "Scan job done"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use termblock_core::{FetchError, WordlistError};

    #[test]
    fn test_tick_from() {
        assert_eq!(tick_from(Ok(true)), Tick::Worked);
        assert_eq!(tick_from(Ok(false)), Tick::Idle);
        assert_eq!(
            tick_from(Err(CollectError::Fetch(FetchError::Cancelled))),
            Tick::Stop
        );
        assert_eq!(
            tick_from(Err(CollectError::Wordlist(WordlistError::Empty))),
            Tick::Idle
        );
    }
}
