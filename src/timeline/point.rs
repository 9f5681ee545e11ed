//! PointTimeline: items indexed by a single date

use crate::config::TimelineOptions;
use crate::core::date::RawDate;
use crate::core::event::{ListenerId, PointChange, Target, TimelineEvent};
use crate::core::item::{DateField, Identify};
use crate::core::temporal::{DayRange, Midnight};
use crate::error::Result;
use crate::index::{DayBucket, DayIndexCore};
use crate::query::{Day, DayQueryOptions, Direction, QueryOptions};
use crate::timeline::members::{Items, Members};
use crate::timeline::BatchOutcome;
use hashbrown::{HashMap, HashSet};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Event type of a [`PointTimeline`]
pub type PointEvent<Id> = TimelineEvent<Id, PointChange>;

/// Timeline associating each item with exactly one day.
///
/// The day comes from one date attribute, read through the [`DateField`]
/// given at construction and normalized to local midnight. Items whose
/// attribute is missing or unparseable are not indexed.
///
/// # Example
///
/// ```
/// use temporal_days::prelude::*;
///
/// #[derive(Clone)]
/// struct Task { id: u32, due: &'static str }
///
/// impl Identify for Task {
///     type Id = u32;
///     fn id(&self) -> u32 { self.id }
/// }
///
/// let mut timeline = PointTimeline::new(DateField::new("due", |t: &Task| Some(t.due.into())));
/// assert!(timeline.add(Task { id: 1, due: "2025-10-20" }));
/// assert_eq!(timeline.get("2025-10-20").unwrap().len(), 1);
/// ```
pub struct PointTimeline<T: Identify> {
    core: DayIndexCore<T::Id, PointChange>,
    field: DateField<T>,
    members: Members<T, Midnight>,
}

impl<T: Identify> PointTimeline<T> {
    pub fn new(field: DateField<T>) -> Self {
        Self::with_options(field, TimelineOptions::default())
    }

    pub fn with_options(field: DateField<T>, options: TimelineOptions) -> Self {
        Self {
            core: DayIndexCore::new(&options),
            field,
            members: Members::default(),
        }
    }

    /// Build a timeline and index `items` in one batch
    pub fn from_items<I>(field: DateField<T>, items: I, options: TimelineOptions) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut timeline = Self::with_options(field, options);
        timeline.add_many(items);
        timeline
    }

    /// Name of the indexed date attribute
    pub fn field_name(&self) -> &str {
        self.field.name()
    }

    fn resolve_item(&self, item: &T) -> Option<Midnight> {
        self.field
            .read(item)
            .and_then(|raw| self.core.normalize(&raw))
    }

    /// Insert or move an item.
    ///
    /// Returns `true` only when the item was not present before. An item
    /// whose date became missing or invalid is deleted. Re-adding an item on
    /// the same day stores the new value without emitting anything.
    pub fn add(&mut self, item: T) -> bool {
        let id = item.id();
        let Some(at) = self.resolve_item(&item) else {
            if !self.delete(&id) {
                tracing::debug!(field = self.field.name(), id = ?id, "item without a valid date skipped");
            }
            return false;
        };

        match self.members.get_mut(&id) {
            Some(member) if member.value == at => {
                member.item = item;
                false
            }
            Some(member) => {
                let prev_at = std::mem::replace(&mut member.value, at);
                member.item = item;
                self.core.remove(&prev_at, &id);
                self.core.insert(at, id.clone());
                let event = TimelineEvent::Item {
                    id,
                    change: PointChange {
                        at: Some(at),
                        prev_at: Some(prev_at),
                    },
                };
                self.core.commit(BTreeSet::from([prev_at, at]), vec![event], &[]);
                false
            }
            None => {
                self.members.insert(id.clone(), item, at);
                self.core.insert(at, id.clone());
                let event = TimelineEvent::Item {
                    id,
                    change: PointChange {
                        at: Some(at),
                        prev_at: None,
                    },
                };
                self.core.commit(BTreeSet::from([at]), vec![event], &[]);
                true
            }
        }
    }

    /// Alias of [`add`](Self::add)
    pub fn update(&mut self, item: T) -> bool {
        self.add(item)
    }

    /// Add or move many items with one bucket pass per day and one emission.
    ///
    /// When the same item appears several times the last value wins; only
    /// net changes relative to the state before the call are emitted.
    pub fn add_many<I>(&mut self, items: I) -> BatchOutcome
    where
        I: IntoIterator<Item = T>,
    {
        let mut order = Vec::new();
        let mut latest: HashMap<T::Id, T> = HashMap::new();
        for item in items {
            let id = item.id();
            if latest.insert(id.clone(), item).is_none() {
                order.push(id);
            }
        }

        let mut outcome = BatchOutcome::default();
        let mut removals: HashMap<Midnight, HashSet<T::Id>> = HashMap::new();
        let mut additions: HashMap<Midnight, Vec<T::Id>> = HashMap::new();
        let mut item_events = Vec::new();
        let mut deleted = Vec::new();

        for id in order {
            let Some(item) = latest.remove(&id) else {
                continue;
            };
            let at = self.resolve_item(&item);
            let current = self.members.get(&id).map(|member| member.value);
            match (at, current) {
                (None, None) => {
                    tracing::debug!(field = self.field.name(), id = ?id, "item without a valid date skipped");
                }
                (None, Some(prev_at)) => {
                    self.members.remove(&id);
                    removals.entry(prev_at).or_default().insert(id.clone());
                    item_events.push(TimelineEvent::Item {
                        id: id.clone(),
                        change: PointChange {
                            at: None,
                            prev_at: Some(prev_at),
                        },
                    });
                    deleted.push(id);
                    outcome.removed += 1;
                }
                (Some(at), Some(prev_at)) if at == prev_at => {
                    if let Some(member) = self.members.get_mut(&id) {
                        member.item = item;
                    }
                }
                (Some(at), Some(prev_at)) => {
                    if let Some(member) = self.members.get_mut(&id) {
                        member.item = item;
                        member.value = at;
                    }
                    removals.entry(prev_at).or_default().insert(id.clone());
                    additions.entry(at).or_default().push(id.clone());
                    item_events.push(TimelineEvent::Item {
                        id,
                        change: PointChange {
                            at: Some(at),
                            prev_at: Some(prev_at),
                        },
                    });
                    outcome.updated += 1;
                }
                (Some(at), None) => {
                    self.members.insert(id.clone(), item, at);
                    additions.entry(at).or_default().push(id.clone());
                    item_events.push(TimelineEvent::Item {
                        id,
                        change: PointChange {
                            at: Some(at),
                            prev_at: None,
                        },
                    });
                    outcome.added += 1;
                }
            }
        }

        let touched: BTreeSet<Midnight> = removals.keys().chain(additions.keys()).copied().collect();
        for day in &touched {
            let add = additions.remove(day).unwrap_or_default();
            self.core.patch(*day, removals.get(day), add);
        }
        self.core.commit(touched, item_events, &deleted);

        tracing::debug!(
            added = outcome.added,
            updated = outcome.updated,
            removed = outcome.removed,
            "point batch applied"
        );
        outcome
    }

    /// Alias of [`add_many`](Self::add_many)
    pub fn update_many<I>(&mut self, items: I) -> BatchOutcome
    where
        I: IntoIterator<Item = T>,
    {
        self.add_many(items)
    }

    /// Remove an item by identity
    pub fn delete(&mut self, id: &T::Id) -> bool {
        let Some(member) = self.members.remove(id) else {
            return false;
        };
        let prev_at = member.value;
        self.core.remove(&prev_at, id);
        let event = TimelineEvent::Item {
            id: id.clone(),
            change: PointChange {
                at: None,
                prev_at: Some(prev_at),
            },
        };
        self.core
            .commit(BTreeSet::from([prev_at]), vec![event], std::slice::from_ref(id));
        true
    }

    /// Remove the stored item with the same identity as `item`
    pub fn delete_item(&mut self, item: &T) -> bool {
        self.delete(&item.id())
    }

    /// Remove many items with one bucket pass per day and one emission.
    /// Returns how many were present.
    pub fn delete_many<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator,
        I::Item: std::borrow::Borrow<T::Id>,
    {
        let mut removals: HashMap<Midnight, HashSet<T::Id>> = HashMap::new();
        let mut item_events = Vec::new();
        let mut deleted = Vec::new();

        for id in ids {
            let id: &T::Id = std::borrow::Borrow::borrow(&id);
            let Some(member) = self.members.remove(id) else {
                continue;
            };
            removals.entry(member.value).or_default().insert(id.clone());
            item_events.push(TimelineEvent::Item {
                id: id.clone(),
                change: PointChange {
                    at: None,
                    prev_at: Some(member.value),
                },
            });
            deleted.push(id.clone());
        }

        let touched: BTreeSet<Midnight> = removals.keys().copied().collect();
        for day in &touched {
            self.core.patch(*day, removals.get(day), Vec::new());
        }
        self.core.commit(touched, item_events, &deleted);
        deleted.len()
    }

    /// Remove every item, emitting the same events as deleting them all
    pub fn clear(&mut self) {
        let ids: Vec<T::Id> = self.members.ids().cloned().collect();
        self.delete_many(ids);
    }

    pub fn has(&self, id: &T::Id) -> bool {
        self.members.contains(id)
    }

    /// The stored item with this identity
    pub fn get_item(&self, id: &T::Id) -> Option<&T> {
        self.members.get(id).map(|member| &member.item)
    }

    /// The day an item is indexed under
    pub fn get_at(&self, id: &T::Id) -> Option<Midnight> {
        self.members.get(id).map(|member| member.value)
    }

    /// First item, in storage order, matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|item| predicate(item))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Earliest day holding an item
    pub fn start_at(&self) -> Option<Midnight> {
        self.core.start_at()
    }

    /// Latest day holding an item
    pub fn end_at(&self) -> Option<Midnight> {
        self.core.end_at()
    }

    pub fn bounds(&self) -> Option<DayRange> {
        self.core.bounds()
    }

    /// Number of days holding at least one item
    pub fn days_count(&self) -> usize {
        self.core.days_count()
    }

    fn bucket_items<'a>(&'a self, bucket: &'a DayBucket<T::Id>) -> impl Iterator<Item = &'a T> + 'a {
        bucket
            .iter()
            .filter_map(|id| self.members.get(id).map(|member| &member.item))
    }

    fn day_items(&self, day: &Midnight) -> Vec<&T> {
        self.core
            .bucket(day)
            .map(|bucket| self.bucket_items(bucket).collect())
            .unwrap_or_default()
    }

    /// Items of one day
    pub fn get(&self, date: impl Into<RawDate>) -> Result<Vec<&T>> {
        let day = self.core.resolve(&date.into())?;
        Ok(self.day_items(&day))
    }

    /// Items of one day in bucket order, paginated by `options`
    pub fn get_with(&self, date: impl Into<RawDate>, options: &QueryOptions) -> Result<Vec<&T>> {
        let day = self.core.resolve(&date.into())?;
        let items = self
            .core
            .bucket(&day)
            .into_iter()
            .flat_map(|bucket| self.bucket_items(bucket));
        Ok(options.paginate(items).collect())
    }

    /// Items dated within `[start, end]`, chronological by day then bucket
    /// order. Empty when `start` is after `end`.
    pub fn get_between(
        &self,
        start: impl Into<RawDate>,
        end: impl Into<RawDate>,
        options: &QueryOptions,
    ) -> Result<Vec<&T>> {
        Ok(options.paginate(self.iterate(start, end)?).collect())
    }

    /// Every item; chronological when `options.sorted`
    pub fn get_all(&self, options: &QueryOptions) -> Vec<&T> {
        if options.sorted {
            let chronological = self
                .core
                .buckets()
                .flat_map(|(_, bucket)| self.bucket_items(bucket));
            options.paginate(chronological).collect()
        } else {
            options.paginate(self.iter()).collect()
        }
    }

    /// Lazy form of [`get_between`](Self::get_between) without pagination
    pub fn iterate(
        &self,
        start: impl Into<RawDate>,
        end: impl Into<RawDate>,
    ) -> Result<impl Iterator<Item = &T> + '_> {
        let range = self.core.resolve_range(&start.into(), &end.into())?;
        Ok(range.into_iter().flat_map(move |range| {
            self.core
                .range_buckets(range.start_at, range.end_at)
                .flat_map(move |(_, bucket)| self.bucket_items(bucket))
        }))
    }

    /// The day view of `date`, empty when no item falls on it
    pub fn get_day(&self, date: impl Into<RawDate>) -> Result<Day<'_, T>> {
        let day = self.core.resolve(&date.into())?;
        Ok(Day::new(day, self.day_items(&day)))
    }

    /// Day views within `[start, end]`
    pub fn get_days(
        &self,
        start: impl Into<RawDate>,
        end: impl Into<RawDate>,
        options: &DayQueryOptions,
    ) -> Result<Vec<Day<'_, T>>> {
        Ok(self.iterate_days(start, end, options)?.collect())
    }

    /// Lazy form of [`get_days`](Self::get_days)
    pub fn iterate_days(
        &self,
        start: impl Into<RawDate>,
        end: impl Into<RawDate>,
        options: &DayQueryOptions,
    ) -> Result<impl Iterator<Item = Day<'_, T>> + '_> {
        let range = self.core.resolve_range(&start.into(), &end.into())?;
        Ok(self.walk(range, *options))
    }

    /// Day views over the whole timeline
    pub fn days(&self, options: &DayQueryOptions) -> impl Iterator<Item = Day<'_, T>> + '_ {
        self.walk(self.core.bounds(), *options)
    }

    fn walk(
        &self,
        range: Option<DayRange>,
        options: DayQueryOptions,
    ) -> impl Iterator<Item = Day<'_, T>> + '_ {
        range.into_iter().flat_map(move |range| {
            self.core.walk_days(range, &options).map(move |(day, bucket)| {
                let items = bucket
                    .map(|bucket| self.bucket_items(bucket).collect())
                    .unwrap_or_default();
                Day::new(day, items)
            })
        })
    }

    /// Days holding items within `[start, end]`
    pub fn get_dates(&self, start: impl Into<RawDate>, end: impl Into<RawDate>) -> Result<Vec<Midnight>> {
        let range = self.core.resolve_range(&start.into(), &end.into())?;
        Ok(range
            .map(|r| self.core.range_keys(r.start_at, r.end_at).collect())
            .unwrap_or_default())
    }

    /// Every day holding items, ascending
    pub fn dates(&self) -> Vec<Midnight> {
        self.core.buckets().map(|(day, _)| day).collect()
    }

    /// `date` itself when it holds items, otherwise the nearest day in
    /// `direction`; the earlier day wins a tie
    pub fn get_closest_day(
        &self,
        date: impl Into<RawDate>,
        direction: Direction,
    ) -> Result<Option<Day<'_, T>>> {
        let day = self.core.resolve(&date.into())?;
        Ok(self
            .core
            .closest(day, direction)
            .map(|at| Day::new(at, self.day_items(&at))))
    }

    /// `(day, items)` pairs, ascending
    pub fn entries(&self) -> impl Iterator<Item = (Midnight, Vec<&T>)> + '_ {
        self.core
            .buckets()
            .map(move |(day, bucket)| (day, self.bucket_items(bucket).collect()))
    }

    /// Every item in storage order
    pub fn iter(&self) -> Items<'_, T, Midnight> {
        Items::new(self.members.iter())
    }

    /// Register a listener
    pub fn on<F>(&self, target: Target<T::Id>, listener: F) -> Result<ListenerId>
    where
        F: FnMut(&PointEvent<T::Id>) -> anyhow::Result<()> + 'static,
    {
        self.core.subscribe(&target, false, Rc::new(RefCell::new(listener)))
    }

    /// Register a listener removed after its first invocation
    pub fn once<F>(&self, target: Target<T::Id>, listener: F) -> Result<ListenerId>
    where
        F: FnMut(&PointEvent<T::Id>) -> anyhow::Result<()> + 'static,
    {
        self.core.subscribe(&target, true, Rc::new(RefCell::new(listener)))
    }

    /// Remove one listener, or all listeners of `target` when `listener` is
    /// `None`. Returns how many were removed.
    pub fn off(&self, target: Target<T::Id>, listener: Option<ListenerId>) -> Result<usize> {
        self.core.unsubscribe(&target, listener)
    }

    /// Number of listeners registered on `target`
    pub fn listener_count(&self, target: Target<T::Id>) -> Result<usize> {
        self.core.listener_count(&target)
    }
}

impl<T: Identify> fmt::Debug for PointTimeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointTimeline")
            .field("field", &self.field)
            .field("len", &self.members.len())
            .field("core", &self.core)
            .finish()
    }
}

impl<'a, T: Identify> IntoIterator for &'a PointTimeline<T> {
    type Item = &'a T;
    type IntoIter = Items<'a, T, Midnight>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Identify> Extend<T> for PointTimeline<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.add_many(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheOptions;
    use chrono::NaiveDate;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Event {
        id: &'static str,
        at: Option<RawDate>,
    }

    impl Identify for Event {
        type Id = &'static str;

        fn id(&self) -> &'static str {
            self.id
        }
    }

    fn ev(id: &'static str, at: &str) -> Event {
        Event {
            id,
            at: Some(at.into()),
        }
    }

    fn day(d: u32) -> Midnight {
        Midnight::of_date(NaiveDate::from_ymd_opt(2025, 10, d).unwrap()).unwrap()
    }

    fn timeline() -> PointTimeline<Event> {
        PointTimeline::with_options(
            DateField::new("at", |e: &Event| e.at.clone()),
            TimelineOptions::new().with_cache(CacheOptions::local()),
        )
    }

    fn ids(items: Vec<&Event>) -> Vec<&'static str> {
        let mut ids: Vec<_> = items.into_iter().map(|e| e.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_add_then_readd_is_idempotent() {
        let mut t = timeline();
        assert!(t.add(ev("1", "2025-10-20")));
        assert!(!t.add(ev("1", "2025-10-20T18:00:00")));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get_at(&"1"), Some(day(20)));
    }

    #[test]
    fn test_move_between_days() {
        let mut t = timeline();
        t.add(ev("1", "2025-10-20"));
        t.add(ev("2", "2025-10-20"));
        assert!(!t.add(ev("1", "2025-10-22")));

        assert_eq!(ids(t.get("2025-10-20").unwrap()), vec!["2"]);
        assert_eq!(ids(t.get("2025-10-22").unwrap()), vec!["1"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.end_at(), Some(day(22)));
    }

    #[test]
    fn test_dateless_item_is_removed() {
        let mut t = timeline();
        t.add(ev("1", "2025-10-20"));
        assert!(!t.add(Event { id: "1", at: None }));
        assert!(!t.has(&"1"));
        assert!(t.is_empty());
        assert_eq!(t.start_at(), None);
        assert_eq!(t.days_count(), 0);
    }

    #[test]
    fn test_add_many_last_write_wins() {
        let mut t = timeline();
        t.add(ev("gone", "2025-10-01"));
        let outcome = t.add_many(vec![
            ev("a", "2025-10-05"),
            ev("b", "2025-10-06"),
            ev("a", "2025-10-07"),
            Event { id: "gone", at: Some("bogus".into()) },
            Event { id: "never", at: None },
        ]);
        assert_eq!(
            outcome,
            BatchOutcome {
                added: 2,
                updated: 0,
                removed: 1
            }
        );
        assert_eq!(t.get_at(&"a"), Some(day(7)));
        assert!(t.get("2025-10-05").unwrap().is_empty());
        assert_eq!(t.bounds(), Some(DayRange::new(day(6), day(7))));
    }

    #[test]
    fn test_add_many_emits_net_changes_once() {
        let mut t = timeline();
        t.add(ev("a", "2025-10-05"));
        let bounds_calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&bounds_calls);
        t.on(Target::Bounds, move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        })
        .unwrap();
        let day_calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&day_calls);
        t.on(Target::date("2025-10-09"), move |event| {
            if let TimelineEvent::Date(change) = event {
                assert_eq!(change.size, 2);
            }
            seen.set(seen.get() + 1);
            Ok(())
        })
        .unwrap();

        t.add_many(vec![ev("a", "2025-10-09"), ev("b", "2025-10-09"), ev("c", "2025-10-01")]);

        assert_eq!(bounds_calls.get(), 1);
        assert_eq!(day_calls.get(), 1);
    }

    #[test]
    fn test_delete_many_counts_present_only() {
        let mut t = timeline();
        t.add_many(vec![ev("a", "2025-10-01"), ev("b", "2025-10-01"), ev("c", "2025-10-03")]);
        assert_eq!(t.delete_many(["a", "c", "zzz", "a"]), 2);
        assert_eq!(t.len(), 1);
        assert_eq!(t.dates(), vec![day(1)]);
    }

    #[test]
    fn test_range_queries() {
        let mut t = timeline();
        t.add_many(vec![
            ev("15", "2025-10-15"),
            ev("20", "2025-10-20"),
            ev("25", "2025-10-25"),
        ]);
        let opts = QueryOptions::new();
        assert_eq!(ids(t.get_between("2025-10-18", "2025-10-22", &opts).unwrap()), vec!["20"]);
        assert_eq!(
            ids(t.get_between("2025-10-15", "2025-10-25", &opts).unwrap()),
            vec!["15", "20", "25"]
        );
        assert!(t.get_between("2025-10-25", "2025-10-15", &opts).unwrap().is_empty());

        let page: Vec<_> = t
            .get_between("2025-10-01", "2025-10-31", &QueryOptions::new().offset(1).limit(1))
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(page, vec!["20"]);

        let sorted: Vec<_> = t
            .get_all(&QueryOptions::new().sorted())
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(sorted, vec!["15", "20", "25"]);
    }

    #[test]
    fn test_query_with_invalid_date_errors() {
        let t = timeline();
        assert!(t.get("not a date").is_err());
        assert!(t.get_day(f64::NAN).is_err());
        assert!(t.on(Target::date("nope"), |_| Ok(())).is_err());
    }

    #[test]
    fn test_days_with_empty_padding() {
        let mut t = timeline();
        t.add_many(vec![ev("a", "2025-10-01"), ev("b", "2025-10-04")]);

        let sparse = t
            .get_days("2025-10-01", "2025-10-04", &DayQueryOptions::new())
            .unwrap();
        assert_eq!(sparse.len(), 2);

        let dense = t
            .get_days("2025-10-01", "2025-10-04", &DayQueryOptions::new().include_empty())
            .unwrap();
        let sizes: Vec<_> = dense.iter().map(Day::size).collect();
        assert_eq!(sizes, vec![1, 0, 0, 1]);

        let all: Vec<_> = t.days(&DayQueryOptions::new().include_empty().limit(2)).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].at, day(2));
    }

    #[test]
    fn test_closest_day() {
        let mut t = timeline();
        t.add_many(vec![ev("a", "2025-10-08"), ev("b", "2025-10-12")]);
        let closest = t.get_closest_day("2025-10-10", Direction::Either).unwrap().unwrap();
        assert_eq!(closest.at, day(8));
        let after = t.get_closest_day("2025-10-10", Direction::After).unwrap().unwrap();
        assert_eq!(after.items[0].id, "b");
        assert!(t.get_closest_day("2025-10-13", Direction::After).unwrap().is_none());
    }

    #[test]
    fn test_item_listener_pruned_after_delete() {
        let mut t = timeline();
        t.add(ev("a", "2025-10-08"));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&changes);
        t.on(Target::item("a"), move |event| {
            if let TimelineEvent::Item { change, .. } = event {
                log.borrow_mut().push(*change);
            }
            Ok(())
        })
        .unwrap();

        t.add(ev("a", "2025-10-09"));
        t.delete(&"a");

        assert_eq!(
            *changes.borrow(),
            vec![
                PointChange {
                    at: Some(day(9)),
                    prev_at: Some(day(8))
                },
                PointChange {
                    at: None,
                    prev_at: Some(day(9))
                },
            ]
        );
        assert_eq!(t.listener_count(Target::item("a")).unwrap(), 0);
    }

    #[test]
    fn test_day_listener_pruned_when_day_empties() {
        let mut t = timeline();
        t.add_many(vec![ev("a", "2025-10-08"), ev("b", "2025-10-08")]);
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&sizes);
        t.on(Target::date(day(8)), move |event| {
            if let TimelineEvent::Date(change) = event {
                log.borrow_mut().push(change.size);
            }
            Ok(())
        })
        .unwrap();

        t.delete(&"a");
        assert_eq!(t.listener_count(Target::date(day(8))).unwrap(), 1);
        t.add(ev("b", "2025-10-09"));
        assert_eq!(t.listener_count(Target::date(day(8))).unwrap(), 0);

        t.add(ev("c", "2025-10-08"));
        assert_eq!(*RefCell::borrow(&sizes), vec![1, 0]);
    }

    #[test]
    fn test_off_removes_one_or_all() {
        let mut t = timeline();
        let calls = Rc::new(Cell::new(0));
        let mut handles = Vec::new();
        for _ in 0..3 {
            let calls = Rc::clone(&calls);
            let handle = t
                .on(Target::Bounds, move |_| {
                    calls.set(calls.get() + 1);
                    Ok(())
                })
                .unwrap();
            handles.push(handle);
        }

        assert_eq!(t.off(Target::Bounds, Some(handles[1])).unwrap(), 1);
        assert_eq!(t.off(Target::Bounds, Some(handles[1])).unwrap(), 0);
        t.add(ev("a", "2025-10-01"));
        assert_eq!(calls.get(), 2);

        assert_eq!(t.off(Target::Bounds, None).unwrap(), 2);
        t.add(ev("b", "2025-10-05"));
        assert_eq!(calls.get(), 2);
        assert_eq!(t.listener_count(Target::Bounds).unwrap(), 0);
    }

    #[test]
    fn test_get_with_paginates_day() {
        let mut t = timeline();
        t.add_many(vec![
            ev("a", "2025-10-03"),
            ev("b", "2025-10-03"),
            ev("c", "2025-10-03"),
        ]);
        let all = t.get("2025-10-03").unwrap();
        let page = t
            .get_with("2025-10-03", &QueryOptions::new().offset(1).limit(1))
            .unwrap();
        assert_eq!(page, vec![all[1]]);
        assert_eq!(t.get_with("2025-10-03", &QueryOptions::new()).unwrap(), all);
        assert!(t
            .get_with("2025-10-03", &QueryOptions::new().offset(5))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_clear_resets_bounds() {
        let mut t = timeline();
        t.add_many(vec![ev("a", "2025-10-01"), ev("b", "2025-10-04")]);
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.bounds(), None);
        assert_eq!(t.entries().count(), 0);
    }
}
