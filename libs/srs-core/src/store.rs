//! JSON persistence for collections and the shared ease factor.
//!
//! # Format
//! ```json
//! {
//!   "version": 1,
//!   "ease_factor": 2.5,
//!   "next_id": 1,
//!   "items": [
//!     {
//!       "id": 0,
//!       "content": "Mitosis",
//!       "longDescription": "Division of a cell nucleus",
//!       "scheduledStart": "2025-03-02T09:00:00Z",
//!       "originalStart": "2025-03-01T09:00:00Z",
//!       "correctCount": 1
//!     }
//!   ]
//! }
//! ```
//!
//! `next_id` keeps ids of deleted items retired; snapshots without it fall
//! back to one past the largest item id. Exports are a bare JSON array of
//! item records. Imports also accept the browser side panel's field names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithm::clamp_ease;
use crate::collection::ItemCollection;
use crate::error::StoreError;
use crate::types::{GlobalSrsState, ReviewItem, INITIAL_EASE};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub ease_factor: f64,
    /// Id the next new item receives. Absent once ids are exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
    #[serde(default)]
    pub items: Vec<ReviewItem>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            ease_factor: INITIAL_EASE,
            next_id: None,
            items: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn from_parts(collection: &ItemCollection, state: &GlobalSrsState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            ease_factor: state.ease_factor,
            next_id: collection.next_id(),
            items: collection.items().to_vec(),
        }
    }

    pub fn into_parts(self) -> (ItemCollection, GlobalSrsState) {
        (
            ItemCollection::restore(self.items, self.next_id),
            GlobalSrsState::with_ease(self.ease_factor),
        )
    }
}

/// Load a snapshot; a missing file is an empty collection.
pub fn load(path: &Path) -> Result<Snapshot, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot yet, starting empty");
        return Ok(Snapshot::default());
    }
    let content = fs::read_to_string(path)?;
    let mut snapshot: Snapshot = serde_json::from_str(&content)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion(snapshot.version));
    }
    snapshot.ease_factor = if snapshot.ease_factor.is_finite() {
        clamp_ease(snapshot.ease_factor)
    } else {
        INITIAL_EASE
    };
    debug!(path = %path.display(), items = snapshot.items.len(), "loaded snapshot");
    Ok(snapshot)
}

/// Write a snapshot, replacing any previous file atomically.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, &json)?;
    info!(path = %path.display(), items = snapshot.items.len(), "saved snapshot");
    Ok(())
}

/// Write items as a plain JSON array.
pub fn export_items(path: &Path, items: &[ReviewItem]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(items)?;
    write_atomic(path, &json)?;
    info!(path = %path.display(), items = items.len(), "exported items");
    Ok(())
}

/// Read a JSON array of item records.
pub fn read_items(path: &Path) -> Result<Vec<ReviewItem>, StoreError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
