#![forbid(unsafe_code)]

//! Attribute snapshots across re-renders.
//!
//! A host re-render may replace the root's attributes wholesale. The hook
//! snapshots the data attributes right before the patch and restores them
//! right after, so the state markers survive. Entries are keyed by the
//! element's `id` attribute and stored as JSON text.

use std::collections::BTreeMap;

use ahash::AHashMap;
use tracing::{trace, warn};

/// Data-attribute snapshot, without the `data-` prefix.
pub type Dataset = BTreeMap<String, String>;

/// Pending snapshots keyed by element id.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: AHashMap<String, String>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot for `id`. The first snapshot wins until discarded.
    ///
    /// Returns whether a new entry was stored.
    pub fn snapshot(&mut self, id: &str, dataset: &Dataset) -> bool {
        if id.is_empty() || self.entries.contains_key(id) {
            return false;
        }
        match serde_json::to_string(dataset) {
            Ok(json) => {
                trace!(id, entries = dataset.len(), "dataset snapshot");
                self.entries.insert(id.to_owned(), json);
                true
            }
            Err(err) => {
                warn!(id, %err, "dataset snapshot failed");
                false
            }
        }
    }

    /// Decode the snapshot for `id`, leaving it in place.
    pub fn restore(&self, id: &str) -> Option<Dataset> {
        let json = self.entries.get(id)?;
        match serde_json::from_str(json) {
            Ok(dataset) => Some(dataset),
            Err(err) => {
                warn!(id, %err, "dataset snapshot unreadable");
                None
            }
        }
    }

    /// Drop the snapshot for `id`. Returns whether one existed.
    pub fn discard(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Raw stored JSON for `id`.
    pub fn raw(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, id: &str, json: &str) {
        self.entries.insert(id.to_owned(), json.to_owned());
    }
}
