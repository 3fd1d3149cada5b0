//! Scroll memory per cache.
//!
//! Remembers where the user left each cache so switching back restores the
//! position. Entries are keyed by cache identity and never evicted; the
//! memory belongs to the owner of the view and survives view teardown (see
//! `ViewRuntime::destroy`).

use std::collections::HashMap;

use serde::Serialize;
use threadview_core::model::CacheId;

/// Scroll height or position, in renderer units (pixels or rows).
pub type ScrollOffset = u32;

/// Saved scroll state of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollSnapshot {
    pub height: ScrollOffset,
    pub position: ScrollOffset,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollMemory {
    heights: HashMap<CacheId, ScrollOffset>,
    positions: HashMap<CacheId, ScrollOffset>,
}

impl ScrollMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the stored pair for `cache`.
    pub fn record(&mut self, cache: &CacheId, height: ScrollOffset, position: ScrollOffset) {
        self.heights.insert(cache.clone(), height);
        self.positions.insert(cache.clone(), position);
    }

    /// Overwrites only the stored height.
    pub fn record_height(&mut self, cache: &CacheId, height: ScrollOffset) {
        self.heights.insert(cache.clone(), height);
    }

    /// Overwrites only the stored position.
    pub fn record_position(&mut self, cache: &CacheId, position: ScrollOffset) {
        self.positions.insert(cache.clone(), position);
    }

    /// Returns the stored pair, or `None` if the cache was never fully recorded.
    pub fn initial(&self, cache: &CacheId) -> Option<ScrollSnapshot> {
        Some(ScrollSnapshot {
            height: self.height(cache)?,
            position: self.position(cache)?,
        })
    }

    pub fn height(&self, cache: &CacheId) -> Option<ScrollOffset> {
        self.heights.get(cache).copied()
    }

    pub fn position(&self, cache: &CacheId) -> Option<ScrollOffset> {
        self.positions.get(cache).copied()
    }

    pub fn len(&self) -> usize {
        self.heights.len().max(self.positions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty() && self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites() {
        let mut memory = ScrollMemory::new();
        let cache = CacheId::new("a");
        memory.record(&cache, 500, 120);
        memory.record(&cache, 800, 40);
        assert_eq!(
            memory.initial(&cache),
            Some(ScrollSnapshot {
                height: 800,
                position: 40
            })
        );
    }

    #[test]
    fn test_unknown_cache_is_none_not_zero() {
        let memory = ScrollMemory::new();
        assert_eq!(memory.initial(&CacheId::new("never")), None);
        assert_eq!(memory.height(&CacheId::new("never")), None);
    }

    #[test]
    fn test_height_and_position_are_independent() {
        let mut memory = ScrollMemory::new();
        let cache = CacheId::new("a");
        memory.record_height(&cache, 300);
        assert_eq!(memory.height(&cache), Some(300));
        assert_eq!(memory.position(&cache), None);
        assert_eq!(memory.initial(&cache), None);
    }
}
