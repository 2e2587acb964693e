//! One-shot API calls
//!
//! [`Dribbble`] wraps a single fetch in a [`Response`] whose `json` holds the
//! decoded body. Nothing is paged, merged or remembered between calls. Options
//! such as `page` and `per_page` are forwarded to the transport verbatim.
//!
//! The named calls are async. Each one is [`Dribbble::fetch`] on a fixed
//! [`Endpoint`], so the blocking and callback forms go through
//! [`Dribbble::fetch_blocking`] and [`Dribbble::fetch_with`] with that same
//! endpoint:
//!
//! ```rust,ignore
//! let shot = dribbble.fetch_blocking(&Endpoint::Shot("21603".into()), &options);
//! dribbble.fetch_with(Endpoint::Followers("dan".into()), options, |response| {
//!     println!("{:?}", response.json);
//! })?;
//! ```

use crate::config::Settings;
use crate::dispatch;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::pager::Pager;
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};
use crate::types::{clamp_per_page, FeedKind, QueryOptions, DEFAULT_PER_PAGE};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Entry point for stateless calls and for creating pagers
#[derive(Clone)]
pub struct Dribbble {
    transport: Arc<dyn Transport>,
    per_page: u32,
    state_path: Option<PathBuf>,
}

impl Dribbble {
    /// Create a facade over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            per_page: DEFAULT_PER_PAGE,
            state_path: None,
        }
    }

    /// Create an HTTP-backed facade from settings
    ///
    /// Pagers created through [`Dribbble::pager`] inherit the configured page
    /// size and storage path.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = HttpTransport::with_config(settings.http_client_config())?;
        Ok(Self {
            transport: Arc::new(transport),
            per_page: clamp_per_page(settings.per_page),
            state_path: settings.state_path.clone(),
        })
    }

    /// The transport shared by every call and pager
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Create a pager that shares this facade's transport
    pub fn pager(&self, kind: FeedKind, player: Option<String>) -> Result<Pager> {
        let pager = Pager::new(kind, player, self.transport())?;
        pager.set_per_page(self.per_page);
        pager.set_storage_path(self.state_path.clone());
        Ok(pager)
    }

    /// Resume a pager from a state file, falling back to the configured one
    pub fn resume_pager(&self, path: Option<PathBuf>) -> Result<Pager> {
        let path = path
            .or_else(|| self.state_path.clone())
            .ok_or_else(|| Error::config("no state file given and no state_path configured"))?;
        Pager::read_from(path, self.transport())
    }

    // ========================================================================
    // Generic calls
    // ========================================================================

    /// Fetch any endpoint
    pub async fn fetch(&self, endpoint: &Endpoint, options: &QueryOptions) -> Response {
        debug!(%endpoint, ?options, "Fetching");
        Response::from_fetched(self.transport.fetch_json(endpoint, options).await)
    }

    /// Blocking form of [`Dribbble::fetch`]
    pub fn fetch_blocking(&self, endpoint: &Endpoint, options: &QueryOptions) -> Response {
        dispatch::block_on_response(self.fetch(endpoint, options))
    }

    /// Start [`Dribbble::fetch`] in the background; `completion` gets the response
    pub fn fetch_with<C>(
        &self,
        endpoint: Endpoint,
        options: QueryOptions,
        completion: C,
    ) -> Result<JoinHandle<()>>
    where
        C: FnOnce(Response) + Send + 'static,
    {
        let facade = self.clone();
        dispatch::spawn_with(
            async move { facade.fetch(&endpoint, &options).await },
            completion,
        )
    }

    // ========================================================================
    // Feed listings
    // ========================================================================

    /// One page of every recent shot ([`Endpoint::EveryoneShots`])
    pub async fn everyone_shots(&self, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::EveryoneShots, options).await
    }

    /// One page of popular shots ([`Endpoint::PopularShots`])
    pub async fn popular_shots(&self, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::PopularShots, options).await
    }

    /// One page of debut shots ([`Endpoint::DebutShots`])
    pub async fn debut_shots(&self, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::DebutShots, options).await
    }

    /// One page of shots by a player
    pub async fn player_shots(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::PlayerShots(player.to_string()), options)
            .await
    }

    /// One page of shots by players `player` follows
    pub async fn followed_player_shots(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::FollowedPlayerShots(player.to_string()), options)
            .await
    }

    /// One page of shots `player` liked
    pub async fn likes_for_player(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::PlayerLikes(player.to_string()), options)
            .await
    }

    // ========================================================================
    // Single resources
    // ========================================================================

    /// Shot detail ([`Endpoint::Shot`])
    pub async fn shot(&self, id: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::Shot(id.to_string()), options).await
    }

    /// Comments on a shot
    pub async fn comments_for_shot(&self, id: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::ShotComments(id.to_string()), options)
            .await
    }

    /// Player profile ([`Endpoint::Player`])
    pub async fn player(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::Player(player.to_string()), options).await
    }

    /// Players following `player`
    pub async fn followers(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::Followers(player.to_string()), options)
            .await
    }

    /// Players `player` follows
    pub async fn following(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::Following(player.to_string()), options)
            .await
    }

    /// Players drafted by `player`
    pub async fn player_draftees(&self, player: &str, options: &QueryOptions) -> Response {
        self.fetch(&Endpoint::Draftees(player.to_string()), options)
            .await
    }
}

impl std::fmt::Debug for Dribbble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dribbble")
            .field("per_page", &self.per_page)
            .field("state_path", &self.state_path)
            .finish_non_exhaustive()
    }
}
