//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, MergeMode, OutputFormat, PagingArgs};
use crate::config::Settings;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::facade::Dribbble;
use crate::merge::{AppendMerger, DedupMerger, SortMerger};
use crate::pager::Pager;
use crate::types::{FeedKind, JsonValue, QueryOptions, Shot};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Settings from the settings file (if any), the environment and flags
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.cli.settings {
            Some(path) => Settings::from_file(path)?,
            None => {
                let mut settings = Settings::default();
                settings.apply_env();
                settings
            }
        };

        if let Some(base_url) = &self.cli.base_url {
            settings.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.cli.token {
            settings.access_token = Some(token.clone());
        }
        Ok(settings)
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let dribbble = Dribbble::from_settings(&self.settings()?)?;

        match &self.cli.command {
            Commands::Shots {
                feed,
                player,
                pages,
                per_page,
                merge,
                save,
            } => {
                self.shots(
                    &dribbble,
                    *feed,
                    player.clone(),
                    *pages,
                    *per_page,
                    *merge,
                    save.as_deref(),
                )
                .await
            }
            Commands::Resume { state, pages } => {
                self.resume(&dribbble, state.clone(), *pages).await
            }
            Commands::Shot { id } => {
                self.fetch(&dribbble, Endpoint::Shot(id.clone()), &PagingArgs::default())
                    .await
            }
            Commands::Comments { id, paging } => {
                self.fetch(&dribbble, Endpoint::ShotComments(id.clone()), paging)
                    .await
            }
            Commands::Player { player } => {
                self.fetch(
                    &dribbble,
                    Endpoint::Player(player.clone()),
                    &PagingArgs::default(),
                )
                .await
            }
            Commands::Followers { player, paging } => {
                self.fetch(&dribbble, Endpoint::Followers(player.clone()), paging)
                    .await
            }
            Commands::Following { player, paging } => {
                self.fetch(&dribbble, Endpoint::Following(player.clone()), paging)
                    .await
            }
            Commands::Draftees { player, paging } => {
                self.fetch(&dribbble, Endpoint::Draftees(player.clone()), paging)
                    .await
            }
        }
    }

    // ========================================================================
    // Paged commands
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    async fn shots(
        &self,
        dribbble: &Dribbble,
        feed: FeedKind,
        player: Option<String>,
        pages: u32,
        per_page: Option<u32>,
        merge: MergeMode,
        save: Option<&Path>,
    ) -> Result<()> {
        let pager = dribbble.pager(feed, player)?;
        if let Some(per_page) = per_page {
            pager.set_per_page(per_page);
        }
        match merge {
            MergeMode::Append => pager.set_merger(AppendMerger::new()),
            MergeMode::Dedup => pager.set_merger(DedupMerger::new()),
            MergeMode::Likes => pager.set_merger(SortMerger::by_likes()),
        }

        let start = Instant::now();
        let outcome = pager.load_pages(pages).await.into_result();
        info!(
            feed = %feed,
            pages = pager.current_page(),
            shots = pager.shots().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded shots"
        );

        self.emit_shots(&pager.shots());
        if let Some(path) = save {
            pager.write_to(path, true)?;
        }
        outcome.map(|_| ())
    }

    async fn resume(&self, dribbble: &Dribbble, state: Option<PathBuf>, pages: u32) -> Result<()> {
        let pager = dribbble.resume_pager(state)?;
        let already_loaded = pager.shots().len();

        let mut outcome = Ok(());
        for _ in 0..pages {
            if let Err(e) = pager.load().await.into_result() {
                warn!(error = %e, "Stopping resume");
                outcome = Err(e);
                break;
            }
        }

        let shots = pager.shots();
        self.emit_shots(shots.get(already_loaded..).unwrap_or_default());
        report_progress(&pager, already_loaded);

        pager.write_to_default_storage(true)?;
        outcome
    }

    // ========================================================================
    // One-shot commands
    // ========================================================================

    async fn fetch(&self, dribbble: &Dribbble, endpoint: Endpoint, paging: &PagingArgs) -> Result<()> {
        let mut options = QueryOptions::new();
        if let Some(page) = paging.page {
            options.insert("page".to_string(), page.to_string());
        }
        if let Some(per_page) = paging.per_page {
            options.insert("per_page".to_string(), per_page.to_string());
        }

        let body = dribbble.fetch(&endpoint, &options).await.into_result()?;
        if let Some(body) = body {
            self.emit(&body);
        }
        Ok(())
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn emit_shots(&self, shots: &[Shot]) {
        match self.cli.format {
            OutputFormat::Json => {
                for shot in shots {
                    self.emit(shot);
                }
            }
            OutputFormat::Pretty => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(shots).unwrap_or_default()
                );
            }
        }
    }

    fn emit(&self, value: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

fn report_progress(pager: &Pager, already_loaded: usize) {
    info!(
        feed = %pager.kind(),
        current_page = pager.current_page(),
        new_shots = pager.shots().len().saturating_sub(already_loaded),
        "Resumed pager"
    );
}
