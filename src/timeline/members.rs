//! Dense item storage with O(1) lookup and removal

use crate::core::item::Identify;
use hashbrown::HashMap;
use std::slice;

/// A stored item with the day (or day range) it is indexed under
#[derive(Debug, Clone)]
pub(crate) struct Member<T, V> {
    pub item: T,
    pub value: V,
}

/// Items in a `Vec` plus an id → position map.
///
/// Removal swaps the last element into the hole, so iteration order is
/// unspecified. The moved element's position is updated on every swap.
#[derive(Debug)]
pub(crate) struct Members<T: Identify, V> {
    entries: Vec<Member<T, V>>,
    positions: HashMap<T::Id, usize>,
}

impl<T: Identify, V> Default for Members<T, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: Identify, V> Members<T, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &T::Id) -> Option<&Member<T, V>> {
        self.positions.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut Member<T, V>> {
        let pos = *self.positions.get(id)?;
        Some(&mut self.entries[pos])
    }

    /// Store a new item; the caller guarantees `id` is not present
    pub fn insert(&mut self, id: T::Id, item: T, value: V) {
        self.positions.insert(id, self.entries.len());
        self.entries.push(Member { item, value });
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<Member<T, V>> {
        let pos = self.positions.remove(id)?;
        let member = self.entries.swap_remove(pos);
        if let Some(moved) = self.entries.get(pos) {
            self.positions.insert(moved.item.id(), pos);
        }
        Some(member)
    }

    pub fn iter(&self) -> slice::Iter<'_, Member<T, V>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &T::Id> + '_ {
        self.positions.keys()
    }
}

/// Iterator over the items of a timeline in storage order
pub struct Items<'a, T, V> {
    inner: slice::Iter<'a, Member<T, V>>,
}

impl<'a, T, V> Items<'a, T, V> {
    pub(crate) fn new(inner: slice::Iter<'a, Member<T, V>>) -> Self {
        Self { inner }
    }
}

impl<'a, T, V> Iterator for Items<'a, T, V> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|member| &member.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, V> ExactSizeIterator for Items<'_, T, V> {}
