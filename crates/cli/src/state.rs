use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

use termblock_core::{
    load_matcher, CollectOptions, Config, FetchContext, FetchOptions, FileWordlistSource,
    HttpApiClient, Identity, Matcher, ProfileCollector, Shutdown, SqliteStore,
    SystemClock, TokenStore,
};

/// Shared command state
pub struct AppState {
    config: Config,
    store: Arc<SqliteStore>,
    shutdown: Shutdown,
}

impl AppState {
    pub fn new(config: Config, store: Arc<SqliteStore>, shutdown: Shutdown) -> Self {
        Self {
            config,
            store,
            shutdown,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    /// Fetch context whose client sends `user_token` for user endpoints.
    pub fn context(&self, user_token: Option<String>) -> Result<FetchContext> {
        let mut client =
            HttpApiClient::new(&self.config.api).context("Failed to create API client")?;
        if let Some(token) = user_token {
            client.set_user_token(token);
        }

        Ok(FetchContext::new(
            Arc::new(client),
            Arc::new(self.shutdown.sleeper()),
            Arc::new(SystemClock),
            FetchOptions::from(&self.config.fetch),
        ))
    }

    /// Look up the stored token of `screen_name`.
    pub fn identity(&self, screen_name: &str) -> Result<(Identity, String)> {
        match self.store.get_by_screen_name(screen_name)? {
            Some(found) => Ok(found),
            None => bail!(
                "No token stored for '{}', run import-token first",
                screen_name
            ),
        }
    }

    /// Context acting as `as_user` if given, app-only otherwise.
    pub fn user_context(&self, as_user: Option<&str>) -> Result<(FetchContext, Option<Identity>)> {
        match as_user {
            Some(name) => {
                let (identity, token) = self.identity(name)?;
                debug!(screen_name = %identity.screen_name, user_id = identity.user_id, "Acting as user");
                Ok((self.context(Some(token))?, Some(identity)))
            }
            None => Ok((self.context(None)?, None)),
        }
    }

    /// Read the word list from disk again.
    pub fn load_matcher(&self) -> Result<Matcher> {
        let wordlist = &self.config.wordlist;
        load_matcher(&FileWordlistSource::new(&wordlist.path), wordlist)
            .with_context(|| format!("Failed to load wordlist {:?}", wordlist.path))
    }

    pub fn collector(&self, ctx: FetchContext) -> Result<ProfileCollector> {
        Ok(
            ProfileCollector::new(ctx, self.load_matcher()?, Arc::clone(&self.store))
                .with_options(CollectOptions::from(&self.config.daemon)),
        )
    }
}
