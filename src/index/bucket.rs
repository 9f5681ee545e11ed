//! Per-day item storage

use hashbrown::HashSet;
use std::hash::Hash;

/// Smallest backing allocation of a bucket
pub const MIN_BUCKET_CAPACITY: usize = 8;

/// Unordered item ids of one day.
///
/// Storage grows by doubling and is never reallocated on shrink: removals
/// only lower `len` and clear the vacated slots so no stale id is retained.
#[derive(Debug, Clone)]
pub struct DayBucket<K> {
    slots: Vec<Option<K>>,
    len: usize,
}

impl<K> Default for DayBucket<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> DayBucket<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots, live or not
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn push(&mut self, id: K) {
        if self.len == self.slots.len() {
            self.grow();
        }
        self.slots[self.len] = Some(id);
        self.len += 1;
    }

    fn grow(&mut self) {
        let capacity = (self.slots.len() * 2).max(MIN_BUCKET_CAPACITY);
        self.slots.resize_with(capacity, || None);
    }

    /// Swap-with-last removal of one id.
    ///
    /// Finding `id` is a linear scan, so this is O(bucket length); batches go
    /// through [`remove_all`](Self::remove_all) instead.
    pub fn remove(&mut self, id: &K) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let last = self.len - 1;
        self.slots.swap(pos, last);
        self.slots[last] = None;
        self.len = last;
        true
    }

    /// Remove every id in `ids` in a single pass; returns how many were removed
    pub fn remove_all(&mut self, ids: &HashSet<K>) -> usize {
        let mut kept = 0;
        for i in 0..self.len {
            let keep = self.slots[i].as_ref().is_some_and(|id| !ids.contains(id));
            if keep {
                self.slots.swap(kept, i);
                kept += 1;
            }
        }
        let removed = self.len - kept;
        for slot in &mut self.slots[kept..self.len] {
            *slot = None;
        }
        self.len = kept;
        removed
    }

    pub fn contains(&self, id: &K) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &K) -> Option<usize> {
        self.slots[..self.len]
            .iter()
            .position(|slot| slot.as_ref() == Some(id))
    }

    /// Live ids in bucket order
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots[..self.len].iter().flatten()
    }

    /// Copy of the live ids
    pub fn to_vec(&self) -> Vec<K> {
        self.iter().cloned().collect()
    }
}
