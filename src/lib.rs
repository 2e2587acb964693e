// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Dribbble Pager
//!
//! A client-side pager for the Dribbble shots API. It fetches ordered pages
//! of shots, accumulates them, lets the caller decide how fresh pages are
//! merged, and can save and restore its paging state so a session resumes
//! where it left off.
//!
//! ## Features
//!
//! - **Stateful paging**: `load`, `load_page`, `load_pages` with resume from
//!   the accumulated shot count
//! - **Pluggable merging**: append (default), de-duplicate by id, or sort by
//!   likes through the [`ShotsMerger`] trait
//! - **Blocking or callback delivery**: one async core with `_blocking` and
//!   `_with(completion)` entry points
//! - **Persistence**: versioned JSON state with atomic writes
//! - **One-shot calls**: shot, comments, player, followers, following, draftees
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dribbble_pager::{Dribbble, FeedKind, Settings};
//!
//! #[tokio::main]
//! async fn main() -> dribbble_pager::Result<()> {
//!     let dribbble = Dribbble::from_settings(&Settings::default())?;
//!
//!     let pager = dribbble.pager(FeedKind::Popular, None)?;
//!     pager.load_pages(2).await.into_result()?;
//!     println!("{} shots", pager.shots().len());
//!
//!     pager.write_to("popular.json", true)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────┐   ┌──────────────────────────┐
//! │ Pager                         │   │ Dribbble (one-shot calls)│
//! │ load / load_page / load_pages │   │ shot, player, followers  │
//! │ ShotsMerger   persist         │   │                          │
//! └──────────────┬────────────────┘   └────────────┬─────────────┘
//!                │        Response envelope        │
//!                └───────────────┬─────────────────┘
//!                        Transport trait
//!                                │
//!              HttpTransport: Endpoint → HttpClient → JsonDecoder
//!                            (retry, backoff)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and backoff
pub mod http;

/// API endpoint layout
pub mod endpoint;

/// Response decoders
pub mod decode;

/// Transport seam and its HTTP implementation
pub mod transport;

/// Result envelope
pub mod response;

/// Blocking and callback dispatch
pub mod dispatch;

/// Merge strategies
pub mod merge;

/// Stateful pager and persistence
pub mod pager;

/// One-shot API calls
pub mod facade;

/// Settings
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::Settings;
pub use endpoint::Endpoint;
pub use facade::Dribbble;
pub use merge::{AppendMerger, DedupMerger, ShotsMerger, SortMerger};
pub use pager::{Pager, PagerRef, PagerSnapshot};
pub use response::Response;
pub use transport::{Fetched, HttpTransport, PageRequest, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
