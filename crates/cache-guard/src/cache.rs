//! The guarded cache and its entries.

/// Number of entries in a freshly constructed cache.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// One unit of cached state.
///
/// Entries carry no identity beyond their position in the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Placeholder payload.
    pub value: i64,
}

/// An ordered, fixed-size collection of [`CacheEntry`] values.
///
/// A `Cache` is deliberately not `Clone`: at any instant it is owned either by
/// the [`CacheSlot`](crate::CacheSlot) or by the unit of work that borrowed it,
/// and moving it is the only way to hand it over.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Cache {
    entries: Vec<CacheEntry>,
    generation: u64,
}

impl Cache {
    /// Builds a cache with `size` default entries.
    pub fn with_entries(size: usize) -> Self {
        Self {
            entries: vec![CacheEntry::default(); size],
            generation: 0,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [CacheEntry] {
        &mut self.entries
    }

    /// How many units of work have completed against this instance.
    ///
    /// Zero for a cache that was just built.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn advance_generation(&mut self) {
        self.generation += 1;
    }
}
