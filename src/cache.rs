//! Bounded least-recently-used cache of parsed SMIL documents.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::smil::SmilDocument;

/// Keeps the most recently used documents, keyed by document name.
///
/// Entries are ordered from least to most recently used. A capacity of zero
/// disables caching entirely.
#[derive(Debug)]
pub struct DocumentCache {
    capacity: usize,
    entries: IndexMap<String, Arc<SmilDocument>>,
}

impl DocumentCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a document and mark it as most recently used.
    pub fn get(&mut self, name: &str) -> Option<Arc<SmilDocument>> {
        let document = self.entries.shift_remove(name)?;
        self.entries.insert(name.to_string(), Arc::clone(&document));
        Some(document)
    }

    /// Insert a document, evicting the least recently used ones over capacity.
    pub fn insert(&mut self, document: Arc<SmilDocument>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.shift_remove(document.name());
        self.entries.insert(document.name().to_string(), document);
        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Arc<SmilDocument> {
        Arc::new(SmilDocument::parse(name, "<smil/>".to_string()).unwrap())
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = DocumentCache::new(2);
        cache.insert(doc("a.smil"));
        cache.insert(doc("b.smil"));

        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a.smil").is_some());
        cache.insert(doc("c.smil"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b.smil").is_none());
        assert!(cache.get("a.smil").is_some());
        assert!(cache.get("c.smil").is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = DocumentCache::new(0);
        cache.insert(doc("a.smil"));
        assert!(cache.is_empty());
        assert!(cache.get("a.smil").is_none());
    }

    #[test]
    fn test_reinsert_does_not_duplicate() {
        let mut cache = DocumentCache::new(4);
        cache.insert(doc("a.smil"));
        cache.insert(doc("a.smil"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
