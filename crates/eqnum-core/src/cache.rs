//! Label cache snapshots.
//!
//! A [`LabelCache`] is never mutated after construction. The synchronization
//! pipeline builds a fresh one per cycle and publishes it through a
//! [`LabelCacheCell`]; readers hold an `Arc` to whichever snapshot was current
//! when they loaded it.

use crate::scanner::Label;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable key → label mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCache {
    entries: HashMap<String, Label>,
}

impl LabelCache {
    /// Builds a cache from labels in scan order. A later label with the same
    /// key replaces the earlier entry.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = Label>,
    {
        let mut entries = HashMap::new();
        for label in labels {
            entries.insert(label.key.clone(), label);
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Label> {
        self.entries.get(key)
    }

    pub fn ordinal(&self, key: &str) -> Option<u32> {
        self.entries.get(key).map(|label| label.ordinal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holder for the current cache snapshot.
///
/// Replacement is a single atomic pointer swap, so a reader observes either
/// the old snapshot or the new one.
pub struct LabelCacheCell {
    current: ArcSwap<LabelCache>,
}

impl std::fmt::Debug for LabelCacheCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelCacheCell")
            .field("labels", &self.current.load().len())
            .finish()
    }
}

impl LabelCacheCell {
    /// Creates a cell holding an empty cache.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(LabelCache::default()),
        }
    }

    /// Returns the current snapshot.
    pub fn load(&self) -> Arc<LabelCache> {
        self.current.load_full()
    }

    /// Publishes a new snapshot, returning the one it replaced.
    pub fn replace(&self, cache: LabelCache) -> Arc<LabelCache> {
        self.current.swap(Arc::new(cache))
    }

    /// Drops the current snapshot in favor of an empty one.
    pub fn clear(&self) {
        self.current.store(Arc::new(LabelCache::default()));
    }
}

impl Default for LabelCacheCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(key: &str, line: usize, ordinal: u32) -> Label {
        Label {
            key: key.into(),
            line,
            ordinal,
            span: 0..key.len() + 8,
            commented: true,
        }
    }

    #[test]
    fn test_from_labels_last_wins() {
        let cache = LabelCache::from_labels(vec![label("x", 0, 1), label("x", 5, 2)]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("x").unwrap().line, 5);
        assert_eq!(cache.ordinal("x"), Some(2));
    }

    #[test]
    fn test_missing_key() {
        let cache = LabelCache::from_labels(vec![label("a", 0, 1)]);
        assert_eq!(cache.ordinal("b"), None);
    }

    #[test]
    fn test_cell_starts_empty() {
        let cell = LabelCacheCell::new();
        assert!(cell.load().is_empty());
    }

    #[test]
    fn test_replace_keeps_old_snapshot_alive() {
        let cell = LabelCacheCell::new();
        cell.replace(LabelCache::from_labels(vec![label("a", 0, 1)]));

        let before = cell.load();
        let previous = cell.replace(LabelCache::from_labels(vec![label("b", 0, 1)]));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.ordinal("a"), Some(1));
        assert_eq!(cell.load().ordinal("a"), None);
        assert_eq!(cell.load().ordinal("b"), Some(1));
    }

    #[test]
    fn test_clear() {
        let cell = LabelCacheCell::new();
        cell.replace(LabelCache::from_labels(vec![label("a", 0, 1)]));
        cell.clear();
        assert!(cell.load().is_empty());
    }
}
