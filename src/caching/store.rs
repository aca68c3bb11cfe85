use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace};

use super::CacheKey;
use crate::error::Result;

/// A type-erased memoized value.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

type Slot = Mutex<Option<CachedValue>>;

/// Concurrent memoization store with per-key first-writer-wins semantics.
///
/// The map from keys to slots is only locked long enough to find or create a
/// slot. Generators run while holding their own slot's lock alone, so
/// concurrent requests for one key wait for the single generator call while
/// requests for other keys proceed in parallel.
///
/// A generator must not request its own key again: the slot lock is not
/// reentrant.
#[derive(Default)]
pub struct ScopedCache {
    slots: RwLock<HashMap<CacheKey, Arc<Slot>>>,
}

impl ScopedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, running `factory` if it is absent.
    ///
    /// If the factory fails its error is returned and nothing is stored, so a
    /// later request runs a factory again. The empty slot is dropped from the
    /// map unless another request is already waiting on it.
    pub fn get_or_add(
        &self,
        key: CacheKey,
        factory: &mut dyn FnMut() -> Result<CachedValue>,
    ) -> Result<CachedValue> {
        let slot = self.slot(&key);
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = value.as_ref() {
            trace!(key = key.name(), generation = key.generation(), "cache hit");
            return Ok(Arc::clone(cached));
        }

        trace!(key = key.name(), generation = key.generation(), "cache miss");
        match factory() {
            Ok(created) => {
                *value = Some(Arc::clone(&created));
                Ok(created)
            }
            Err(e) => {
                debug!(key = key.name(), error = %e, "generator failed, slot left empty");
                // map lock is always taken before a slot lock
                drop(value);
                self.discard_empty(&key, &slot);
                Err(e)
            }
        }
    }

    /// Returns the value stored under `key` without creating it.
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let slot = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;
        let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        value.clone()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of keys holding a value.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drops every entry of a generation older than `current_generation`.
    ///
    /// Returns the number of evicted keys.
    pub fn evict_superseded(&self, current_generation: usize) -> usize {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let before = slots.len();
        slots.retain(|key, _| key.generation() >= current_generation);
        let evicted = before - slots.len();
        if evicted > 0 {
            debug!(evicted, current_generation, "evicted superseded cache entries");
        }
        evicted
    }

    /// Removes `slot` from the map if it is still empty and only the map and
    /// the caller hold it.
    fn discard_empty(&self, key: &CacheKey, slot: &Arc<Slot>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let unshared = slots
            .get(key)
            .is_some_and(|stored| Arc::ptr_eq(stored, slot) && Arc::strong_count(slot) == 2);
        if unshared && slot.lock().unwrap_or_else(PoisonError::into_inner).is_none() {
            slots.remove(key);
        }
    }

    fn slot(&self, key: &CacheKey) -> Arc<Slot> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

impl fmt::Debug for ScopedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCache")
            .field("entries", &self.len())
            .finish()
    }
}
