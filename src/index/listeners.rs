//! Listener registry and synchronous event dispatch

use crate::core::event::{ListenerId, TimelineEvent};
use crate::core::temporal::Midnight;
use hashbrown::HashMap;
use std::cell::{Cell, RefCell};
use std::hash::Hash;
use std::rc::Rc;

/// Shared callback of one listener
pub type Callback<E> = Rc<RefCell<dyn FnMut(&E) -> anyhow::Result<()>>>;

/// Registry key of a listener
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKey<Id> {
    Bounds,
    Day(Midnight),
    Item(Id),
}

struct Entry<E> {
    id: ListenerId,
    once: bool,
    callback: Callback<E>,
}

impl<E> Clone for Entry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            once: self.once,
            callback: Rc::clone(&self.callback),
        }
    }
}

/// Resets the dispatch flag even if a listener unwinds
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Bounds, per-day and per-item listener lists.
///
/// Dispatch is synchronous. An emission attempted while another one is being
/// dispatched is dropped, so a listener never observes events caused by its
/// own side effects.
pub struct Listeners<Id, C> {
    bounds: RefCell<Vec<Entry<TimelineEvent<Id, C>>>>,
    by_day: RefCell<HashMap<Midnight, Vec<Entry<TimelineEvent<Id, C>>>>>,
    by_item: RefCell<HashMap<Id, Vec<Entry<TimelineEvent<Id, C>>>>>,
    next_id: Cell<u64>,
    dispatching: Cell<bool>,
}

impl<Id, C> Default for Listeners<Id, C> {
    fn default() -> Self {
        Self {
            bounds: RefCell::new(Vec::new()),
            by_day: RefCell::new(HashMap::new()),
            by_item: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            dispatching: Cell::new(false),
        }
    }
}

impl<Id: Eq + Hash + Clone, C> Listeners<Id, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        key: ListenerKey<Id>,
        once: bool,
        callback: Callback<TimelineEvent<Id, C>>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let entry = Entry { id, once, callback };
        match key {
            ListenerKey::Bounds => self.bounds.borrow_mut().push(entry),
            ListenerKey::Day(day) => self.by_day.borrow_mut().entry(day).or_default().push(entry),
            ListenerKey::Item(item) => {
                self.by_item.borrow_mut().entry(item).or_default().push(entry)
            }
        }
        id
    }

    /// Remove one listener, or every listener of `key` when `id` is `None`.
    /// Returns how many were removed.
    pub fn unsubscribe(&self, key: &ListenerKey<Id>, id: Option<ListenerId>) -> usize {
        fn retain<E>(entries: &mut Vec<Entry<E>>, id: Option<ListenerId>) -> usize {
            let before = entries.len();
            match id {
                Some(id) => entries.retain(|e| e.id != id),
                None => entries.clear(),
            }
            before - entries.len()
        }

        match key {
            ListenerKey::Bounds => retain(&mut *self.bounds.borrow_mut(), id),
            ListenerKey::Day(day) => {
                let mut by_day = self.by_day.borrow_mut();
                let Some(entries) = by_day.get_mut(day) else {
                    return 0;
                };
                let removed = retain(entries, id);
                if entries.is_empty() {
                    by_day.remove(day);
                }
                removed
            }
            ListenerKey::Item(item) => {
                let mut by_item = self.by_item.borrow_mut();
                let Some(entries) = by_item.get_mut(item) else {
                    return 0;
                };
                let removed = retain(entries, id);
                if entries.is_empty() {
                    by_item.remove(item);
                }
                removed
            }
        }
    }

    /// Number of listeners registered on `key`
    pub fn count(&self, key: &ListenerKey<Id>) -> usize {
        match key {
            ListenerKey::Bounds => self.bounds.borrow().len(),
            ListenerKey::Day(day) => self.by_day.borrow().get(day).map_or(0, Vec::len),
            ListenerKey::Item(item) => self.by_item.borrow().get(item).map_or(0, Vec::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.borrow().is_empty()
            && self.by_day.borrow().is_empty()
            && self.by_item.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.bounds.borrow_mut().clear();
        self.by_day.borrow_mut().clear();
        self.by_item.borrow_mut().clear();
    }

    fn key_of(event: &TimelineEvent<Id, C>) -> ListenerKey<Id> {
        match event {
            TimelineEvent::Bounds(_) => ListenerKey::Bounds,
            TimelineEvent::Date(change) => ListenerKey::Day(change.at),
            TimelineEvent::Item { id, .. } => ListenerKey::Item(id.clone()),
        }
    }

    fn snapshot(&self, key: &ListenerKey<Id>) -> Vec<Entry<TimelineEvent<Id, C>>> {
        match key {
            ListenerKey::Bounds => self.bounds.borrow().clone(),
            ListenerKey::Day(day) => self.by_day.borrow().get(day).cloned().unwrap_or_default(),
            ListenerKey::Item(item) => self.by_item.borrow().get(item).cloned().unwrap_or_default(),
        }
    }

    /// Deliver `events` in order to the listeners registered for each.
    ///
    /// A failing listener is logged and skipped; fire-once listeners are
    /// removed right after their invocation.
    pub fn emit(&self, events: &[TimelineEvent<Id, C>]) {
        if events.is_empty() || self.is_empty() {
            return;
        }
        if self.dispatching.get() {
            tracing::debug!(dropped = events.len(), "nested emission dropped");
            return;
        }
        self.dispatching.set(true);
        let _guard = DispatchGuard(&self.dispatching);

        for event in events {
            let key = Self::key_of(event);
            for entry in self.snapshot(&key) {
                let result = match entry.callback.try_borrow_mut() {
                    Ok(mut callback) => (&mut *callback)(event),
                    Err(_) => continue,
                };
                if let Err(err) = result {
                    tracing::warn!(
                        kind = %event.kind(),
                        listener = %entry.id,
                        error = %err,
                        "listener failed"
                    );
                }
                if entry.once {
                    self.unsubscribe(&key, Some(entry.id));
                }
            }
        }
    }

    /// Whether a dispatch is in progress
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }
}
