use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use termblock_core::{
    is_valid_screen_name, verify_token, BlockExecutor, BlockOptions, CollectReport, TokenStore,
};

use crate::cli::Command;
use crate::daemon;
use crate::state::AppState;

pub async fn run(state: &AppState, command: Command, as_user: Option<&str>) -> Result<()> {
    match command {
        Command::FetchProfiles { once } => daemon::fetch_profiles(state, as_user, once).await,
        Command::ScanFollow { once } => daemon::scan_follow(state, as_user, once).await,
        Command::Block { screen_name } => block(state, &screen_name).await,
        Command::ImportToken { screen_name, token } => import_token(state, &screen_name, token).await,
        Command::AddScanJobs { names } => {
            let (ctx, _) = state.user_context(as_user)?;
            let added = state.collector(ctx)?.add_scan_jobs(&names).await?;
            info!(added, "Scan jobs added");
            Ok(())
        }
        Command::ImportJson { file } => {
            let (ctx, _) = state.user_context(as_user)?;
            summarize("import-json", state.collector(ctx)?.from_json(&file)?);
            Ok(())
        }
        Command::ScanWordlist => {
            let (ctx, _) = state.user_context(as_user)?;
            summarize("scan-wordlist", state.collector(ctx)?.scan_by_wordlist()?);
            Ok(())
        }
        Command::ExportBlocklist { dir } => {
            let (ctx, _) = state.user_context(as_user)?;
            let path = state.collector(ctx)?.export_blocklist(&dir)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::List { name, kind } => {
            let Some(as_user) = as_user else {
                bail!("list needs --as <screen_name> to select the list owner");
            };
            let (ctx, identity) = state.user_context(Some(as_user))?;
            let owner = identity.context("no identity for list owner")?;
            let report = state
                .collector(ctx)?
                .from_list(owner.user_id, name.as_deref(), kind)
                .await?;
            summarize("list", report);
            Ok(())
        }
        other => collect(state, other, as_user).await,
    }
}

async fn collect(state: &AppState, command: Command, as_user: Option<&str>) -> Result<()> {
    let (ctx, _) = state.user_context(as_user)?;
    let collector = state.collector(ctx)?;

    let (label, report) = match command {
        Command::Mentions { url, kind } => ("mentions", collector.from_mentions(&url, kind).await?),
        Command::Search { query, kind } => ("search", collector.from_search(&query, kind).await?),
        Command::Followers { name } => ("followers", collector.from_followers(&name).await?),
        Command::Following { name } => ("following", collector.from_following(&name).await?),
        Command::Retweets { url } => ("retweets", collector.from_retweets(&url).await?),
        Command::ImportBlocks => ("import-blocks", collector.from_blocklist().await?),
        Command::ScreenNames { kind, names } => {
            ("screen-names", collector.from_screen_names(&names, kind).await?)
        }
        other => bail!("{:?} is not a collection command", other),
    };

    summarize(label, report);
    Ok(())
}

fn summarize(label: &str, report: CollectReport) {
    info!(
        command = label,
        pages = report.pages,
        profiles = report.profiles_seen,
        candidates = report.candidates,
        listed = report.listed,
        ids = report.ids_seen,
        new_ids = report.ids_inserted,
        "Done"
    );
}

async fn block(state: &AppState, screen_name: &str) -> Result<()> {
    if !is_valid_screen_name(screen_name) {
        bail!("invalid screen name '{}'", screen_name);
    }

    let (identity, token) = state.identity(screen_name)?;
    let executor = BlockExecutor::new(state.context(Some(token))?, state.store().clone())
        .with_options(BlockOptions::from(&state.config().block));

    let report = executor.block().await?;
    info!(
        screen_name = %identity.screen_name,
        blocked = report.blocked,
        skipped = report.skipped_already_blocked,
        retried = report.retried,
        "Block run complete"
    );

    if let Some(id) = report.halted {
        bail!("block run halted on account {}", id);
    }
    Ok(())
}

async fn import_token(state: &AppState, screen_name: &str, token: String) -> Result<()> {
    let ctx = state.context(Some(token.clone()))?;
    let Some(identity) = verify_token(&ctx).await? else {
        bail!("token for '{}' could not be verified", screen_name);
    };

    if !identity.screen_name.eq_ignore_ascii_case(screen_name) {
        warn!(
            given = screen_name,
            verified = %identity.screen_name,
            "Token belongs to a different account, storing under the verified name"
        );
    }

    state.store().store(&identity, &token)?;
    info!(screen_name = %identity.screen_name, user_id = identity.user_id, "Token stored");
    Ok(())
}
