//! Merging freshly fetched shots into the accumulated set
//!
//! After every page fetch the pager hands the new page and the current
//! accumulated shots to its [`ShotsMerger`]. Whatever `merge` returns becomes
//! the pager's accumulated set. Ordering and de-duplication are entirely up
//! to the merger.

use crate::pager::Pager;
use crate::types::Shot;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Reconciles fresh shots with previously accumulated ones
///
/// Called while the pager holds the merger, so implementations must not call
/// back into [`Pager::merged_shots`], [`Pager::reset_merger`] or
/// [`Pager::set_merger`] from `will_load`.
pub trait ShotsMerger: Send {
    /// Hook run once before the first fetch of every load operation
    fn will_load(&mut self, pager: &Pager) {
        let _ = pager;
    }

    /// Produce the new accumulated set from a fresh page and the existing set
    fn merge(&mut self, fresh: &[Shot], existing: &[Shot]) -> Vec<Shot>;

    /// Shots introduced by the most recent merge
    fn merged_shots(&self) -> &[Shot];

    /// Clear any internal bookkeeping
    fn reset(&mut self);
}

// ============================================================================
// Append
// ============================================================================

/// Default merger: appends every fresh shot, in fetch order, without de-dup
#[derive(Debug, Clone, Default)]
pub struct AppendMerger {
    merged: Vec<Shot>,
}

impl AppendMerger {
    /// Create a new append merger
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShotsMerger for AppendMerger {
    fn merge(&mut self, fresh: &[Shot], existing: &[Shot]) -> Vec<Shot> {
        self.merged = fresh.to_vec();

        let mut shots = Vec::with_capacity(existing.len() + fresh.len());
        shots.extend_from_slice(existing);
        shots.extend_from_slice(fresh);
        shots
    }

    fn merged_shots(&self) -> &[Shot] {
        &self.merged
    }

    fn reset(&mut self) {
        self.merged.clear();
    }
}

// ============================================================================
// Dedup
// ============================================================================

/// Appends only shots whose key field has not been seen yet
///
/// Shots without the key field are always appended.
#[derive(Debug, Clone)]
pub struct DedupMerger {
    key: String,
    merged: Vec<Shot>,
}

impl Default for DedupMerger {
    fn default() -> Self {
        Self::by_key("id")
    }
}

impl DedupMerger {
    /// De-duplicate on the `id` field
    pub fn new() -> Self {
        Self::default()
    }

    /// De-duplicate on an arbitrary top-level field
    pub fn by_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            merged: Vec::new(),
        }
    }

    fn key_of(&self, shot: &Shot) -> Option<String> {
        shot.get(&self.key).map(ToString::to_string)
    }
}

impl ShotsMerger for DedupMerger {
    fn merge(&mut self, fresh: &[Shot], existing: &[Shot]) -> Vec<Shot> {
        let mut seen: HashSet<String> = existing.iter().filter_map(|s| self.key_of(s)).collect();

        let added: Vec<Shot> = fresh
            .iter()
            .filter(|shot| match self.key_of(shot) {
                Some(key) => seen.insert(key),
                None => true,
            })
            .cloned()
            .collect();

        let mut shots = existing.to_vec();
        shots.extend_from_slice(&added);
        self.merged = added;
        shots
    }

    fn merged_shots(&self) -> &[Shot] {
        &self.merged
    }

    fn reset(&mut self) {
        self.merged.clear();
    }
}

// ============================================================================
// Sort
// ============================================================================

/// Appends, then orders the whole set by a numeric field, highest first
///
/// The sort is stable; shots missing the field sink to the end.
#[derive(Debug, Clone)]
pub struct SortMerger {
    field: String,
    merged: Vec<Shot>,
}

impl SortMerger {
    /// Sort on a numeric top-level field (e.g. `likes_count`)
    pub fn by_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            merged: Vec::new(),
        }
    }

    /// Sort by popularity
    pub fn by_likes() -> Self {
        Self::by_field("likes_count")
    }

    fn score(&self, shot: &Shot) -> Option<f64> {
        shot.get(&self.field).and_then(serde_json::Value::as_f64)
    }
}

impl ShotsMerger for SortMerger {
    fn merge(&mut self, fresh: &[Shot], existing: &[Shot]) -> Vec<Shot> {
        self.merged = fresh.to_vec();

        let mut shots = existing.to_vec();
        shots.extend_from_slice(fresh);
        shots.sort_by(|a, b| match (self.score(a), self.score(b)) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        shots
    }

    fn merged_shots(&self) -> &[Shot] {
        &self.merged
    }

    fn reset(&mut self) {
        self.merged.clear();
    }
}
