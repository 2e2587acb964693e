//! Common types used throughout the pager
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A single feed item as returned by the API
pub type Shot = JsonValue;

/// Free-form query options forwarded to the API (`page`, `per_page`, ...)
pub type QueryOptions = BTreeMap<String, String>;

// ============================================================================
// Paging Constants
// ============================================================================

/// Default number of shots requested per page
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Largest page size the API accepts
pub const MAX_PER_PAGE: u32 = 50;

/// Clamp a requested page size into `1..=MAX_PER_PAGE`
pub fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

// ============================================================================
// Feed Kind
// ============================================================================

/// Which shot listing a pager walks through
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Every recent shot
    Everyone,
    /// Popular shots
    Popular,
    /// Debut shots
    Debut,
    /// Shots by players the given player follows
    FollowedPlayerShots,
    /// Shots the given player liked
    LikesForPlayerShots,
}

impl FeedKind {
    /// Whether this feed is scoped to a player
    pub fn requires_player(self) -> bool {
        matches!(
            self,
            FeedKind::FollowedPlayerShots | FeedKind::LikesForPlayerShots
        )
    }

    /// Stable name used in logs and persisted state
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Everyone => "everyone",
            FeedKind::Popular => "popular",
            FeedKind::Debut => "debut",
            FeedKind::FollowedPlayerShots => "followed_player_shots",
            FeedKind::LikesForPlayerShots => "likes_for_player_shots",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Retry backoff strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Transport Metadata
// ============================================================================

/// Low-level details of the HTTP exchange behind a result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMetadata {
    /// Requested URL (including query string)
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl TransportMetadata {
    /// Create metadata for a URL and status
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
        }
    }

    /// Look up a header (names are stored lowercase)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
