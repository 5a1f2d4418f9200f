//! The single shared location that may hold the cache.

use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Exclusive access to the slot contents.
pub type SlotGuard<'a, T> = MutexGuard<'a, SlotState<T>>;

/// Contents of a [`CacheSlot`]: at most one cache plus the time it was last returned.
///
/// `last_access` is `Some` exactly when `cache` is `Some`; every method keeps
/// the two in step.
#[derive(Debug)]
pub struct SlotState<T> {
    cache: Option<T>,
    last_access: Option<Instant>,
}

impl<T> SlotState<T> {
    fn empty() -> Self {
        Self {
            cache: None,
            last_access: None,
        }
    }

    /// Moves the cache out, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.last_access = None;
        self.cache.take()
    }

    /// Installs `cache`, stamped with `at`.
    ///
    /// Any cache already present is dropped. The protocol only ever puts into
    /// an empty slot.
    pub fn put(&mut self, cache: T, at: Instant) {
        self.cache = Some(cache);
        self.last_access = Some(at);
    }

    /// Drops the cache if present. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        self.last_access = None;
        self.cache.take().is_some()
    }

    /// Time since the cache was last returned, or `None` when the slot is empty.
    pub fn peek_idle_duration(&self, now: Instant) -> Option<Duration> {
        match (&self.cache, self.last_access) {
            (Some(_), Some(at)) => Some(now.saturating_duration_since(at)),
            _ => None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.cache.is_some()
    }

    /// When the current cache was returned, if there is one.
    pub fn last_access(&self) -> Option<Instant> {
        self.last_access
    }

    /// Borrows the contained cache without taking it.
    pub fn get(&self) -> Option<&T> {
        self.cache.as_ref()
    }
}

/// Lock-protected holder of at most one cache instance.
///
/// One mutex guards the slot. [`lock`](Self::lock) waits for it and is what the
/// borrow protocol uses for the whole unit of work; [`try_lock`](Self::try_lock)
/// never waits and is what the reaper uses.
#[derive(Debug)]
pub struct CacheSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> CacheSlot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::empty()),
        }
    }

    /// Creates a slot that already holds `cache`, stamped with `at`.
    pub fn with_cache(cache: T, at: Instant) -> Self {
        let mut state = SlotState::empty();
        state.put(cache, at);
        Self {
            state: Mutex::new(state),
        }
    }

    /// Waits for exclusive access.
    pub async fn lock(&self) -> SlotGuard<'_, T> {
        self.state.lock().await
    }

    /// Attempts exclusive access without waiting.
    ///
    /// Returns `None` when someone else holds the slot.
    pub fn try_lock(&self) -> Option<SlotGuard<'_, T>> {
        self.state.try_lock().ok()
    }

    pub async fn is_occupied(&self) -> bool {
        self.lock().await.is_occupied()
    }

    /// Waits for access, then drops the cache if present.
    pub async fn clear(&self) -> bool {
        self.lock().await.clear()
    }

    pub async fn peek_idle_duration(&self, now: Instant) -> Option<Duration> {
        self.lock().await.peek_idle_duration(now)
    }

    /// Runs `f` against the contained cache, if any, without taking it.
    pub async fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.lock().await.get().map(f)
    }
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
