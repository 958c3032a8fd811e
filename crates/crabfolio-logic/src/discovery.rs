//! Discovery tracker: the set of objects the player has interacted with.
//!
//! The set only grows. Ids are not validated against any catalog; the
//! catalog is supplied separately when computing completion.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Monotonically growing set of discovered object ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySet {
    ids: BTreeSet<String>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`. Returns true only the first time.
    pub fn discover(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn is_discovered(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Discovered ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Completion against a master catalog.
    pub fn progress(&self, catalog: &[&str]) -> CatalogProgress {
        let found = catalog.iter().filter(|id| self.is_discovered(id)).count();
        CatalogProgress::new(found, catalog.len())
    }
}

impl<S: Into<String>> FromIterator<S> for DiscoverySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// How much of the catalog has been found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogProgress {
    pub found: usize,
    pub total: usize,
}

impl CatalogProgress {
    pub fn new(found: usize, total: usize) -> Self {
        Self { found, total }
    }

    /// 0..=100. An empty catalog counts as complete.
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.found as f32 / self.total as f32 * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.found >= self.total
    }
}
