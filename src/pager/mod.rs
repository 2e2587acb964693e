//! Pager module
//!
//! A [`Pager`] walks one shot feed page by page, handing every fetched page to
//! its [`ShotsMerger`] and keeping the merged result as its accumulated shots.
//!
//! # Overview
//!
//! - `load` continues from where the accumulated shots say we are
//! - `load_page` fetches exactly one page
//! - `load_pages` fetches pages `1..=n` in order, merging after each page
//!
//! Each load has an async form, a `_blocking` form and a `_with` form taking
//! a completion closure. Only one load runs at a time per pager; a second one
//! fails immediately with [`Error::ConcurrentLoad`].
//!
//! Pager state can be written to disk and read back with
//! [`Pager::write_to`] / [`Pager::read_from`].

mod persist;

pub use persist::{PagerSnapshot, SNAPSHOT_VERSION};

use crate::dispatch;
use crate::error::{Error, Result};
use crate::merge::{AppendMerger, ShotsMerger};
use crate::response::Response;
use crate::transport::{PageRequest, Transport};
use crate::types::{
    clamp_per_page, FeedKind, QueryOptions, Shot, TransportMetadata, DEFAULT_PER_PAGE,
};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which pages a load operation fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPlan {
    /// The page after the accumulated shots
    Resume,
    /// Exactly this page
    Page(u32),
    /// Pages 1 through n
    Pages(u32),
}

/// Mutable paging state
#[derive(Debug)]
struct PagerState {
    per_page: u32,
    current_page: u32,
    shots: Arc<Vec<Shot>>,
    fresh: Arc<Vec<Shot>>,
    extra: QueryOptions,
    storage_path: Option<PathBuf>,
}

pub(crate) struct Shared {
    kind: FeedKind,
    player: Option<String>,
    transport: Arc<dyn Transport>,
    loading: AtomicBool,
    state: Mutex<PagerState>,
    merger: Mutex<Box<dyn ShotsMerger>>,
}

/// Stateful pager over one shot feed
///
/// Cloning yields another handle to the same pager.
#[derive(Clone)]
pub struct Pager {
    shared: Arc<Shared>,
}

/// Non-owning reference to a [`Pager`], held by responses
#[derive(Clone)]
pub struct PagerRef(Weak<Shared>);

impl PagerRef {
    /// Get the pager back if it is still alive
    pub fn upgrade(&self) -> Option<Pager> {
        self.0.upgrade().map(|shared| Pager { shared })
    }
}

impl std::fmt::Debug for PagerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PagerRef")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

/// Holds the loading flag for one load operation and clears it on drop
///
/// Owned, so a callback load can claim the flag before its task is spawned.
struct LoadingGuard(Arc<Shared>);

impl LoadingGuard {
    fn acquire(shared: &Arc<Shared>) -> Option<Self> {
        shared
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(shared)))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.loading.store(false, Ordering::Release);
    }
}

impl Pager {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a pager for a feed
    ///
    /// `player` is required for [`FeedKind::FollowedPlayerShots`] and
    /// [`FeedKind::LikesForPlayerShots`] and ignored for the other feeds.
    pub fn new(
        kind: FeedKind,
        player: Option<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let player = if kind.requires_player() {
            match player.filter(|p| !p.is_empty()) {
                Some(player) => Some(player),
                None => return Err(Error::missing_player(kind.as_str())),
            }
        } else {
            None
        };

        Ok(Self::build(kind, player, transport))
    }

    /// Pager over every recent shot
    pub fn everyone(transport: Arc<dyn Transport>) -> Self {
        Self::unscoped(FeedKind::Everyone, transport)
    }

    /// Pager over popular shots
    pub fn popular(transport: Arc<dyn Transport>) -> Self {
        Self::unscoped(FeedKind::Popular, transport)
    }

    /// Pager over debut shots
    pub fn debut(transport: Arc<dyn Transport>) -> Self {
        Self::unscoped(FeedKind::Debut, transport)
    }

    /// Pager over shots by players `player` follows
    pub fn followed_player_shots(
        player: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Self::new(FeedKind::FollowedPlayerShots, Some(player.into()), transport)
    }

    /// Pager over shots `player` liked
    pub fn likes_for_player(
        player: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Self::new(FeedKind::LikesForPlayerShots, Some(player.into()), transport)
    }

    fn unscoped(kind: FeedKind, transport: Arc<dyn Transport>) -> Self {
        Self::build(kind, None, transport)
    }

    fn build(kind: FeedKind, player: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Arc::new(Shared {
                kind,
                player,
                transport,
                loading: AtomicBool::new(false),
                state: Mutex::new(PagerState {
                    per_page: DEFAULT_PER_PAGE,
                    current_page: 0,
                    shots: Arc::new(Vec::new()),
                    fresh: Arc::new(Vec::new()),
                    extra: QueryOptions::new(),
                    storage_path: None,
                }),
                merger: Mutex::new(Box::new(AppendMerger::new())),
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Feed this pager walks
    pub fn kind(&self) -> FeedKind {
        self.shared.kind
    }

    /// Player the feed is scoped to
    pub fn player(&self) -> Option<&str> {
        self.shared.player.as_deref()
    }

    /// Shots requested per page
    pub fn per_page(&self) -> u32 {
        self.state().per_page
    }

    /// Set the page size, clamped to `1..=50`
    pub fn set_per_page(&self, per_page: u32) {
        self.state().per_page = clamp_per_page(per_page);
    }

    /// Last page fetched successfully, 0 if none
    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    /// Whether a load operation is in flight
    pub fn is_loading(&self) -> bool {
        self.shared.loading.load(Ordering::Acquire)
    }

    /// Snapshot of the accumulated shots
    ///
    /// The next merge replaces the pager's set; the returned snapshot is not
    /// updated.
    pub fn shots(&self) -> Arc<Vec<Shot>> {
        Arc::clone(&self.state().shots)
    }

    /// The most recently fetched page
    pub fn fresh_shots(&self) -> Arc<Vec<Shot>> {
        Arc::clone(&self.state().fresh)
    }

    /// Shots the merger reports as newly introduced by its last merge
    pub fn merged_shots(&self) -> Vec<Shot> {
        self.merger().merged_shots().to_vec()
    }

    /// Install a merger
    pub fn set_merger(&self, merger: impl ShotsMerger + 'static) {
        *self.merger() = Box::new(merger);
    }

    /// Reset the installed merger's bookkeeping
    pub fn reset_merger(&self) {
        self.merger().reset();
    }

    /// Extra query options sent with every page request
    pub fn set_extra_options(&self, options: QueryOptions) {
        self.state().extra = options;
    }

    /// Default location for [`Pager::write_to_default_storage`]
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.state().storage_path.clone()
    }

    /// Set the default storage location
    pub fn set_storage_path(&self, path: Option<PathBuf>) {
        self.state().storage_path = path;
    }

    /// Page `load` will fetch next: `floor(shots / per_page) + 1`
    pub fn next_page(&self) -> u32 {
        let state = self.state();
        let loaded = u32::try_from(state.shots.len()).unwrap_or(u32::MAX);
        (loaded / state.per_page).saturating_add(1)
    }

    /// Weak reference for responses
    pub fn downgrade(&self) -> PagerRef {
        PagerRef(Arc::downgrade(&self.shared))
    }

    /// Whether two handles refer to the same pager
    pub fn ptr_eq(&self, other: &Pager) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    // ========================================================================
    // Loading (async)
    // ========================================================================

    /// Load the page after the accumulated shots (page 1 when empty)
    pub async fn load(&self) -> Response {
        self.run(LoadPlan::Resume).await
    }

    /// Load exactly page `page` (1-based)
    pub async fn load_page(&self, page: u32) -> Response {
        self.run(LoadPlan::Page(page)).await
    }

    /// Load pages `1..=count`, merging each before requesting the next
    ///
    /// A failure stops the sequence; pages merged so far stay merged.
    pub async fn load_pages(&self, count: u32) -> Response {
        self.run(LoadPlan::Pages(count)).await
    }

    // ========================================================================
    // Loading (blocking)
    // ========================================================================

    /// Blocking form of [`Pager::load`]
    pub fn load_blocking(&self) -> Response {
        dispatch::block_on_response(self.load())
    }

    /// Blocking form of [`Pager::load_page`]
    pub fn load_page_blocking(&self, page: u32) -> Response {
        dispatch::block_on_response(self.load_page(page))
    }

    /// Blocking form of [`Pager::load_pages`]
    pub fn load_pages_blocking(&self, count: u32) -> Response {
        dispatch::block_on_response(self.load_pages(count))
    }

    // ========================================================================
    // Loading (completion callback)
    // ========================================================================

    /// Start [`Pager::load`] in the background; `completion` gets the response
    pub fn load_with<C>(&self, completion: C) -> Result<JoinHandle<()>>
    where
        C: FnOnce(Response) + Send + 'static,
    {
        self.spawn(LoadPlan::Resume, completion)
    }

    /// Start [`Pager::load_page`] in the background
    pub fn load_page_with<C>(&self, page: u32, completion: C) -> Result<JoinHandle<()>>
    where
        C: FnOnce(Response) + Send + 'static,
    {
        self.spawn(LoadPlan::Page(page), completion)
    }

    /// Start [`Pager::load_pages`] in the background
    pub fn load_pages_with<C>(&self, count: u32, completion: C) -> Result<JoinHandle<()>>
    where
        C: FnOnce(Response) + Send + 'static,
    {
        self.spawn(LoadPlan::Pages(count), completion)
    }

    /// The flag is claimed here, before the task exists, so `is_loading` is
    /// already true when this returns. If no runtime is available the future
    /// is dropped unpolled and the guard releases the flag.
    fn spawn<C>(&self, plan: LoadPlan, completion: C) -> Result<JoinHandle<()>>
    where
        C: FnOnce(Response) + Send + 'static,
    {
        match LoadingGuard::acquire(&self.shared) {
            Some(loading) => {
                let pager = self.clone();
                dispatch::spawn_with(
                    async move { pager.run_locked(plan, loading).await },
                    completion,
                )
            }
            None => {
                let rejected = self.reject();
                dispatch::spawn_with(async move { rejected }, completion)
            }
        }
    }

    // ========================================================================
    // Load machinery
    // ========================================================================

    async fn run(&self, plan: LoadPlan) -> Response {
        match LoadingGuard::acquire(&self.shared) {
            Some(loading) => self.run_locked(plan, loading).await,
            None => self.reject(),
        }
    }

    fn reject(&self) -> Response {
        warn!(feed = %self.shared.kind, "Rejected load: another load is in progress");
        self.respond(Some(Error::ConcurrentLoad), None)
    }

    async fn run_locked(&self, plan: LoadPlan, _loading: LoadingGuard) -> Response {
        let pages = match self.pages_for(plan) {
            Ok(pages) => pages,
            Err(e) => return self.respond(Some(e), None),
        };

        self.merger().will_load(self);

        let mut metadata = None;
        for page in pages {
            let request = self.page_request(page);
            debug!(feed = %request.kind, page, per_page = request.per_page, "Fetching page");

            let fetched = self.shared.transport.fetch_page(&request).await;
            metadata = fetched.metadata;

            match fetched.result {
                Ok(fresh) => self.merge_page(page, fresh),
                Err(e) => {
                    warn!(feed = %request.kind, page, error = %e, "Page fetch failed");
                    return self.respond(Some(e), metadata);
                }
            }
        }

        let (current_page, total) = {
            let state = self.state();
            (state.current_page, state.shots.len())
        };
        info!(feed = %self.shared.kind, current_page, shots = total, "Load complete");
        self.respond(None, metadata)
    }

    fn pages_for(&self, plan: LoadPlan) -> Result<RangeInclusive<u32>> {
        match plan {
            LoadPlan::Resume => {
                let page = self.next_page();
                Ok(page..=page)
            }
            LoadPlan::Page(0) | LoadPlan::Pages(0) => Err(Error::InvalidPage { page: 0 }),
            LoadPlan::Page(page) => Ok(page..=page),
            LoadPlan::Pages(count) => Ok(1..=count),
        }
    }

    fn page_request(&self, page: u32) -> PageRequest {
        let state = self.state();
        let mut request = PageRequest::new(
            self.shared.kind,
            self.shared.player.clone(),
            page,
            state.per_page,
        );
        request.extra = state.extra.clone();
        request
    }

    fn merge_page(&self, page: u32, fresh: Vec<Shot>) {
        let fresh = Arc::new(fresh);
        let existing = {
            let mut state = self.state();
            state.fresh = Arc::clone(&fresh);
            Arc::clone(&state.shots)
        };

        let shots = self.merger().merge(&fresh, &existing);
        debug!(page, fresh = fresh.len(), total = shots.len(), "Merged page");

        let mut state = self.state();
        state.shots = Arc::new(shots);
        state.current_page = page;
    }

    fn respond(&self, error: Option<Error>, metadata: Option<TransportMetadata>) -> Response {
        Response::for_pager(self.downgrade(), error, metadata)
    }

    fn state(&self) -> MutexGuard<'_, PagerState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn merger(&self) -> MutexGuard<'_, Box<dyn ShotsMerger>> {
        self.shared
            .merger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Capture the persistent part of the pager
    pub fn snapshot(&self) -> PagerSnapshot {
        let state = self.state();
        PagerSnapshot::new(
            self.shared.kind,
            self.shared.player.clone(),
            state.per_page,
            state.current_page,
            state.shots.as_ref().clone(),
        )
    }

    /// Rebuild a pager from a snapshot
    ///
    /// The merger is reset to the default append merger.
    pub fn from_snapshot(snapshot: PagerSnapshot, transport: Arc<dyn Transport>) -> Result<Self> {
        snapshot.validate()?;

        let pager = Self::new(snapshot.feed_kind, snapshot.player, transport)
            .map_err(|e| Error::deserialization(e.to_string()))?;
        {
            let mut state = pager.state();
            state.per_page = clamp_per_page(snapshot.per_page);
            state.current_page = snapshot.current_page;
            state.shots = Arc::new(snapshot.shots);
        }
        Ok(pager)
    }

    /// Write the pager state to `path`
    ///
    /// With `atomic`, the file is either fully replaced or left untouched.
    pub fn write_to(&self, path: impl AsRef<Path>, atomic: bool) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        persist::write_snapshot(&snapshot, path, atomic)?;
        info!(
            path = %path.display(),
            shots = snapshot.shots.len(),
            current_page = snapshot.current_page,
            "Wrote pager state"
        );
        Ok(())
    }

    /// Write the pager state to its storage path
    pub fn write_to_default_storage(&self, atomic: bool) -> Result<()> {
        let path = self
            .storage_path()
            .ok_or_else(|| Error::config("pager has no storage path"))?;
        self.write_to(path, atomic)
    }

    /// Read a pager previously written with [`Pager::write_to`]
    ///
    /// The path becomes the pager's storage path.
    pub fn read_from(path: impl AsRef<Path>, transport: Arc<dyn Transport>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = persist::read_snapshot(path)?;
        let pager = Self::from_snapshot(snapshot, transport)?;
        pager.set_storage_path(Some(path.to_path_buf()));
        info!(
            path = %path.display(),
            feed = %pager.kind(),
            shots = pager.shots().len(),
            "Read pager state"
        );
        Ok(pager)
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Pager")
            .field("kind", &self.shared.kind)
            .field("player", &self.shared.player)
            .field("per_page", &state.per_page)
            .field("current_page", &state.current_page)
            .field("shots", &state.shots.len())
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
