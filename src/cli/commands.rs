//! CLI commands and argument parsing

use crate::types::FeedKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Dribbble shots pager CLI
#[derive(Parser, Debug)]
#[command(name = "dribbble-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// API root, overrides the settings file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Access token, overrides the settings file and environment
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a shot feed
    Shots {
        /// Feed to read
        #[arg(long, value_enum, default_value = "popular")]
        feed: FeedKind,

        /// Player for player-scoped feeds
        #[arg(long)]
        player: Option<String>,

        /// Number of pages to load, starting at page 1
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Shots per page (1-50)
        #[arg(long)]
        per_page: Option<u32>,

        /// How fresh pages are merged
        #[arg(long, value_enum, default_value = "append")]
        merge: MergeMode,

        /// Write pager state here afterwards
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Continue a saved pager and write it back
    Resume {
        /// State file, defaults to `state_path` from settings
        #[arg(long)]
        state: Option<PathBuf>,

        /// Number of further pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Show one shot
    Shot {
        /// Shot id
        id: String,
    },

    /// List comments on a shot
    Comments {
        /// Shot id
        id: String,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show a player profile
    Player {
        /// Player name or id
        player: String,
    },

    /// List a player's followers
    Followers {
        /// Player name or id
        player: String,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// List players a player follows
    Following {
        /// Player name or id
        player: String,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// List a player's draftees
    Draftees {
        /// Player name or id
        player: String,

        #[command(flatten)]
        paging: PagingArgs,
    },
}

/// `page`/`per_page` for one-shot listings
#[derive(Args, Debug, Clone, Default)]
pub struct PagingArgs {
    /// Page to fetch (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page (max 50)
    #[arg(long)]
    pub per_page: Option<u32>,
}

/// Merge strategy selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MergeMode {
    /// Append every page as fetched
    Append,
    /// Skip shots whose id was already seen
    Dedup,
    /// Keep shots ordered by likes
    Likes,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}
