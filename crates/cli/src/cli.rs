use std::path::PathBuf;

use clap::{Parser, Subcommand};
use termblock_core::BlockListKind;

/// Scan profiles against a word list and block the matches.
#[derive(Debug, Parser)]
#[command(name = "termblock", version, about)]
pub struct Cli {
    /// Configuration file
    #[arg(long, env = "TERMBLOCK_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Act with the stored token of this account
    #[arg(long = "as", value_name = "SCREEN_NAME", global = true)]
    pub as_user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Hydrate unscanned profiles in batches and match them (daemon)
    FetchProfiles {
        /// Run a single step and exit
        #[arg(long)]
        once: bool,
    },
    /// Work through queued follower scans (daemon)
    ScanFollow {
        #[arg(long)]
        once: bool,
    },
    /// Block every pending candidate for this account
    Block { screen_name: String },
    /// Queue accounts whose followers and followings get scanned
    AddScanJobs {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Match direct replies to a status
    Mentions {
        url: String,
        #[arg(long, default_value_t)]
        kind: BlockListKind,
    },
    /// Match authors of tweets found by a search query
    Search {
        query: String,
        #[arg(long, default_value_t)]
        kind: BlockListKind,
    },
    /// Store the follower ids of an account
    Followers { name: String },
    /// Store the ids an account follows
    Following { name: String },
    /// Store the ids of accounts that retweeted a status
    Retweets { url: String },
    /// Store the ids the acting account already blocks
    ImportBlocks,
    /// Put named accounts on a list without matching
    ScreenNames {
        #[arg(long, default_value_t)]
        kind: BlockListKind,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Put all members of a private list of the acting account on a list
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t)]
        kind: BlockListKind,
    },
    /// Import `[{"id": ...}]` as unscanned profiles
    ImportJson { file: PathBuf },
    /// Match stored profiles against the ANY terms
    ScanWordlist,
    /// Write the block list to a timestamped JSON file
    ExportBlocklist { dir: PathBuf },
    /// Verify and store a user token
    ImportToken { screen_name: String, token: String },
}
