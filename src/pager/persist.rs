//! Pager state on disk
//!
//! The state is a versioned JSON document. Atomic writes go to a uniquely
//! named temporary file next to the target, which is synced and then renamed
//! over it, so concurrent writers never share a temporary file.

use crate::error::{Error, Result};
use crate::types::{FeedKind, Shot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::Builder;

/// Format version written by this crate
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild a pager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerSnapshot {
    /// Format version
    pub version: u32,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
    /// Feed the pager walks
    pub feed_kind: FeedKind,
    /// Player scope
    #[serde(default)]
    pub player: Option<String>,
    /// Page size
    pub per_page: u32,
    /// Last page fetched
    #[serde(default)]
    pub current_page: u32,
    /// Accumulated shots, in order
    #[serde(default)]
    pub shots: Vec<Shot>,
}

impl PagerSnapshot {
    /// Create a snapshot stamped with the current time
    pub fn new(
        feed_kind: FeedKind,
        player: Option<String>,
        per_page: u32,
        current_page: u32,
        shots: Vec<Shot>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            feed_kind,
            player,
            per_page,
            current_page,
            shots,
        }
    }

    /// Reject snapshots this crate cannot resume from
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::deserialization(format!(
                "unsupported state version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        if self.per_page == 0 {
            return Err(Error::deserialization("per_page must be positive"));
        }
        Ok(())
    }

    /// Encode as pretty-printed JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Decode from JSON
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::deserialization(e.to_string()))
    }
}

/// Write a snapshot, atomically or in place
pub(super) fn write_snapshot(snapshot: &PagerSnapshot, path: &Path, atomic: bool) -> Result<()> {
    let contents = snapshot.to_json()?;

    let written = if atomic {
        write_atomically(path, &contents)
    } else {
        fs::write(path, &contents)
    };

    written.map_err(|e| {
        Error::serialization(format!("failed to write {}: {e}", path.display()))
    })
}

/// Read and decode a snapshot
pub(super) fn read_snapshot(path: &Path) -> Result<PagerSnapshot> {
    let bytes = fs::read(path).map_err(|e| {
        Error::deserialization(format!("failed to read {}: {e}", path.display()))
    })?;
    PagerSnapshot::from_json(&bytes)
}

fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map_or_else(|| "pager".into(), |n| n.to_string_lossy().into_owned());

    // Removed on drop if anything below fails
    let mut temp = Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
