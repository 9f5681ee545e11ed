//! IntervalTimeline: items indexed over an inclusive range of days

use crate::config::TimelineOptions;
use crate::core::date::RawDate;
use crate::core::event::{ListenerId, RangeChange, Target, TimelineEvent};
use crate::core::item::{DateField, Identify};
use crate::core::temporal::{DayRange, Midnight};
use crate::error::Result;
use crate::index::{DayBucket, DayIndexCore};
use crate::query::{Day, DayQueryOptions, Direction, QueryOptions};
use crate::timeline::members::{Items, Member, Members};
use crate::timeline::BatchOutcome;
use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Event type of an [`IntervalTimeline`]
pub type IntervalEvent<Id> = TimelineEvent<Id, RangeChange>;

/// An item touched by a range query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeMatch<'a, T> {
    pub item: &'a T,
    /// Full stored range of the item
    pub range: DayRange,
    /// Part of `range` inside the queried window
    pub intersection: DayRange,
}

fn change(range: Option<DayRange>, prev: Option<DayRange>) -> RangeChange {
    RangeChange {
        start_at: range.map(|r| r.start_at),
        end_at: range.map(|r| r.end_at),
        prev_start_at: prev.map(|r| r.start_at),
        prev_end_at: prev.map(|r| r.end_at),
    }
}

/// Timeline associating each item with every day of an inclusive range.
///
/// The range comes from a start and an end attribute; inverted values are
/// swapped. Moving or resizing an item only touches the days that enter or
/// leave its range.
pub struct IntervalTimeline<T: Identify> {
    core: DayIndexCore<T::Id, RangeChange>,
    start_field: DateField<T>,
    end_field: DateField<T>,
    members: Members<T, DayRange>,
}

impl<T: Identify> IntervalTimeline<T> {
    pub fn new(start_field: DateField<T>, end_field: DateField<T>) -> Self {
        Self::with_options(start_field, end_field, TimelineOptions::default())
    }

    pub fn with_options(
        start_field: DateField<T>,
        end_field: DateField<T>,
        options: TimelineOptions,
    ) -> Self {
        Self {
            core: DayIndexCore::new(&options),
            start_field,
            end_field,
            members: Members::default(),
        }
    }

    /// Build a timeline and index `items` in one batch
    pub fn from_items<I>(
        start_field: DateField<T>,
        end_field: DateField<T>,
        items: I,
        options: TimelineOptions,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut timeline = Self::with_options(start_field, end_field, options);
        timeline.add_many(items);
        timeline
    }

    /// Names of the start and end attributes
    pub fn field_names(&self) -> (&str, &str) {
        (self.start_field.name(), self.end_field.name())
    }

    fn resolve_item(&self, item: &T) -> Option<DayRange> {
        let start = self.start_field.read(item)?;
        let end = self.end_field.read(item)?;
        let start_at = self.core.normalize(&start)?;
        let end_at = self.core.normalize(&end)?;
        Some(DayRange::new(start_at, end_at))
    }

    fn skipped(&self, id: &T::Id) {
        tracing::debug!(
            start_field = self.start_field.name(),
            end_field = self.end_field.name(),
            id = ?id,
            "item without a valid range skipped"
        );
    }

    /// Insert, move or resize an item.
    ///
    /// Returns `true` only when the item was not present before. On a change
    /// only days leaving the range lose the item and only days entering it
    /// gain it; days in both ranges are not touched.
    pub fn add(&mut self, item: T) -> bool {
        let id = item.id();
        let Some(range) = self.resolve_item(&item) else {
            if !self.delete(&id) {
                self.skipped(&id);
            }
            return false;
        };

        match self.members.get_mut(&id) {
            Some(member) if member.value == range => {
                member.item = item;
                false
            }
            Some(member) => {
                let prev = std::mem::replace(&mut member.value, range);
                member.item = item;
                let mut touched = BTreeSet::new();
                for part in prev.minus(&range).into_iter().flatten() {
                    for day in part.days() {
                        self.core.remove(&day, &id);
                        touched.insert(day);
                    }
                }
                for part in range.minus(&prev).into_iter().flatten() {
                    for day in part.days() {
                        self.core.insert(day, id.clone());
                        touched.insert(day);
                    }
                }
                let event = TimelineEvent::Item {
                    id,
                    change: change(Some(range), Some(prev)),
                };
                self.core.commit(touched, vec![event], &[]);
                false
            }
            None => {
                self.members.insert(id.clone(), item, range);
                let mut touched = BTreeSet::new();
                for day in range.days() {
                    self.core.insert(day, id.clone());
                    touched.insert(day);
                }
                let event = TimelineEvent::Item {
                    id,
                    change: change(Some(range), None),
                };
                self.core.commit(touched, vec![event], &[]);
                true
            }
        }
    }

    /// Alias of [`add`](Self::add)
    pub fn update(&mut self, item: T) -> bool {
        self.add(item)
    }

    /// Add, move or resize many items.
    ///
    /// Day-level additions and removals of all items are gathered first, then
    /// each affected day is patched once (removals, then additions) and a
    /// single emission follows. The last value of a repeated item wins.
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
            let range = self.resolve_item(&item);
            let current = self.members.get(&id).map(|member| member.value);
            match (range, current) {
                (None, None) => self.skipped(&id),
                (None, Some(prev)) => {
                    self.members.remove(&id);
                    for day in prev.days() {
                        removals.entry(day).or_default().insert(id.clone());
                    }
                    item_events.push(TimelineEvent::Item {
                        id: id.clone(),
                        change: change(None, Some(prev)),
                    });
                    deleted.push(id);
                    outcome.removed += 1;
                }
                (Some(range), Some(prev)) if range == prev => {
                    if let Some(member) = self.members.get_mut(&id) {
                        member.item = item;
                    }
                }
                (Some(range), Some(prev)) => {
                    if let Some(member) = self.members.get_mut(&id) {
                        member.item = item;
                        member.value = range;
                    }
                    for part in prev.minus(&range).into_iter().flatten() {
                        for day in part.days() {
                            removals.entry(day).or_default().insert(id.clone());
                        }
                    }
                    for part in range.minus(&prev).into_iter().flatten() {
                        for day in part.days() {
                            additions.entry(day).or_default().push(id.clone());
                        }
                    }
                    item_events.push(TimelineEvent::Item {
                        id,
                        change: change(Some(range), Some(prev)),
                    });
                    outcome.updated += 1;
                }
                (Some(range), None) => {
                    self.members.insert(id.clone(), item, range);
                    for day in range.days() {
                        additions.entry(day).or_default().push(id.clone());
                    }
                    item_events.push(TimelineEvent::Item {
                        id,
                        change: change(Some(range), None),
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
            "interval batch applied"
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
        self.delete_many(std::iter::once(id)) == 1
    }

    /// Remove the stored item with the same identity as `item`
    pub fn delete_item(&mut self, item: &T) -> bool {
        self.delete(&item.id())
    }

    /// Remove many items; each item's whole range is walked to build the
    /// per-day removal sets, then every day is patched once.
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
            for day in member.value.days() {
                removals.entry(day).or_default().insert(id.clone());
            }
            item_events.push(TimelineEvent::Item {
                id: id.clone(),
                change: change(None, Some(member.value)),
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

    pub fn get_item(&self, id: &T::Id) -> Option<&T> {
        self.members.get(id).map(|member| &member.item)
    }

    /// Stored range of an item
    pub fn get_range(&self, id: &T::Id) -> Option<DayRange> {
        self.members.get(id).map(|member| member.value)
    }

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

    pub fn start_at(&self) -> Option<Midnight> {
        self.core.start_at()
    }

    pub fn end_at(&self) -> Option<Midnight> {
        self.core.end_at()
    }

    pub fn bounds(&self) -> Option<DayRange> {
        self.core.bounds()
    }

    /// Number of days with at least one active item
    pub fn days_count(&self) -> usize {
        self.core.days_count()
    }

    fn bucket_members<'a>(
        &'a self,
        bucket: &'a DayBucket<T::Id>,
    ) -> impl Iterator<Item = &'a Member<T, DayRange>> + 'a {
        bucket.iter().filter_map(|id| self.members.get(id))
    }

    fn day_items(&self, day: &Midnight) -> Vec<&T> {
        self.core
            .bucket(day)
            .map(|bucket| self.bucket_members(bucket).map(|m| &m.item).collect())
            .unwrap_or_default()
    }

    /// Items active on one day
    pub fn get(&self, date: impl Into<RawDate>) -> Result<Vec<&T>> {
        let day = self.core.resolve(&date.into())?;
        Ok(self.day_items(&day))
    }

    /// Items active on one day, paginated by `options`; `sorted` orders by
    /// range start, then range end
    pub fn get_with(&self, date: impl Into<RawDate>, options: &QueryOptions) -> Result<Vec<&T>> {
        let day = self.core.resolve(&date.into())?;
        let mut members: Vec<_> = self
            .core
            .bucket(&day)
            .into_iter()
            .flat_map(|bucket| self.bucket_members(bucket))
            .collect();
        if options.sorted {
            Self::sort_by_range(&mut members);
        }
        Ok(options.paginate(members.into_iter()).map(|m| &m.item).collect())
    }

    /// Items whose range starts on `date`
    pub fn get_starts_on(&self, date: impl Into<RawDate>) -> Result<Vec<&T>> {
        let day = self.core.resolve(&date.into())?;
        Ok(self.filter_day(day, |range| range.start_at == day))
    }

    /// Items whose range ends on `date`
    pub fn get_ends_on(&self, date: impl Into<RawDate>) -> Result<Vec<&T>> {
        let day = self.core.resolve(&date.into())?;
        Ok(self.filter_day(day, |range| range.end_at == day))
    }

    fn filter_day<P>(&self, day: Midnight, predicate: P) -> Vec<&T>
    where
        P: Fn(&DayRange) -> bool,
    {
        self.core
            .bucket(&day)
            .map(|bucket| {
                self.bucket_members(bucket)
                    .filter(|m| predicate(&m.value))
                    .map(|m| &m.item)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Members active anywhere in `range`, each once, in first-seen order
    fn members_within(&self, range: Option<DayRange>) -> impl Iterator<Item = &Member<T, DayRange>> + '_ {
        let mut seen: HashSet<&T::Id> = HashSet::new();
        range
            .into_iter()
            .flat_map(move |range| self.core.range_buckets(range.start_at, range.end_at))
            .flat_map(|(_, bucket)| bucket.iter())
            .filter(move |id| seen.insert(*id))
            .filter_map(move |id| self.members.get(id))
    }

    fn sort_by_range(members: &mut [&Member<T, DayRange>]) {
        members.sort_by_key(|m| (m.value.start_at, m.value.end_at));
    }

    /// Items active anywhere in `[start, end]`, each reported once.
    ///
    /// `sorted` orders by range start, then range end. Empty when `start` is
    /// after `end`.
    pub fn get_between(
        &self,
        start: impl Into<RawDate>,
        end: impl Into<RawDate>,
        options: &QueryOptions,
    ) -> Result<Vec<&T>> {
        let range = self.core.resolve_range(&start.into(), &end.into())?;
        let members = self.members_within(range);
        if options.sorted {
            let mut members: Vec<_> = members.collect();
            Self::sort_by_range(&mut members);
            Ok(options.paginate(members.into_iter()).map(|m| &m.item).collect())
        } else {
            Ok(options.paginate(members).map(|m| &m.item).collect())
        }
    }

    /// Every item; ordered by range when `options.sorted`
    pub fn get_all(&self, options: &QueryOptions) -> Vec<&T> {
        if options.sorted {
            let mut members: Vec<_> = self.members.iter().collect();
            Self::sort_by_range(&mut members);
            options.paginate(members.into_iter()).map(|m| &m.item).collect()
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
        Ok(self.members_within(range).map(|m| &m.item))
    }

    /// Items touched by `[start, end]` (or the single day `start` when `end`
    /// is `None`) with their full range and its clipped intersection.
    /// `sorted` orders by range start, then range end.
    pub fn get_ranges(
        &self,
        start: impl Into<RawDate>,
        end: Option<RawDate>,
        options: &QueryOptions,
    ) -> Result<Vec<RangeMatch<'_, T>>> {
        let matches = self.iterate_ranges(start, end)?;
        if options.sorted {
            let mut matches: Vec<_> = matches.collect();
            matches.sort_by_key(|m| (m.range.start_at, m.range.end_at));
            Ok(options.paginate(matches.into_iter()).collect())
        } else {
            Ok(options.paginate(matches).collect())
        }
    }

    /// Lazy form of [`get_ranges`](Self::get_ranges)
    pub fn iterate_ranges(
        &self,
        start: impl Into<RawDate>,
        end: Option<RawDate>,
    ) -> Result<impl Iterator<Item = RangeMatch<'_, T>> + '_> {
        let start = start.into();
        let end = end.unwrap_or_else(|| start.clone());
        let window = self.core.resolve_range(&start, &end)?;
        Ok(self.members_within(window).filter_map(move |m| {
            let intersection = window?.intersection(&m.value)?;
            Some(RangeMatch {
                item: &m.item,
                range: m.value,
                intersection,
            })
        }))
    }

    /// All items active on `date`
    pub fn get_day(&self, date: impl Into<RawDate>) -> Result<Day<'_, T>> {
        let day = self.core.resolve(&date.into())?;
        Ok(Day::new(day, self.day_items(&day)))
    }

    pub fn get_days(
        &self,
        start: impl Into<RawDate>,
        end: impl Into<RawDate>,
        options: &DayQueryOptions,
    ) -> Result<Vec<Day<'_, T>>> {
        Ok(self.iterate_days(start, end, options)?.collect())
    }

    /// Day views within `[start, end]`.
    ///
    /// With `unique_only`, an item spanning several days is only listed on
    /// the first day of the traversal it appears on.
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
        let mut seen: HashSet<&T::Id> = HashSet::new();
        range
            .into_iter()
            .flat_map(move |range| self.core.walk_days(range, &options))
            .map(move |(day, bucket)| {
                let items = bucket
                    .map(|bucket| {
                        bucket
                            .iter()
                            .filter(|id| !options.unique_only || seen.insert(*id))
                            .filter_map(|id| self.members.get(id))
                            .map(|m| &m.item)
                            .collect()
                    })
                    .unwrap_or_default();
                Day::new(day, items)
            })
    }

    pub fn get_dates(&self, start: impl Into<RawDate>, end: impl Into<RawDate>) -> Result<Vec<Midnight>> {
        let range = self.core.resolve_range(&start.into(), &end.into())?;
        Ok(range
            .map(|r| self.core.range_keys(r.start_at, r.end_at).collect())
            .unwrap_or_default())
    }

    pub fn dates(&self) -> Vec<Midnight> {
        self.core.buckets().map(|(day, _)| day).collect()
    }

    /// `date` itself when an item is active on it, otherwise the nearest such
    /// day in `direction`; the earlier day wins a tie
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

    /// `(day, active items)` pairs, ascending
    pub fn entries(&self) -> impl Iterator<Item = (Midnight, Vec<&T>)> + '_ {
        self.core.buckets().map(move |(day, bucket)| {
            (day, self.bucket_members(bucket).map(|m| &m.item).collect())
        })
    }

    /// Every item in storage order
    pub fn iter(&self) -> Items<'_, T, DayRange> {
        Items::new(self.members.iter())
    }

    pub fn on<F>(&self, target: Target<T::Id>, listener: F) -> Result<ListenerId>
    where
        F: FnMut(&IntervalEvent<T::Id>) -> anyhow::Result<()> + 'static,
    {
        self.core.subscribe(&target, false, Rc::new(RefCell::new(listener)))
    }

    pub fn once<F>(&self, target: Target<T::Id>, listener: F) -> Result<ListenerId>
    where
        F: FnMut(&IntervalEvent<T::Id>) -> anyhow::Result<()> + 'static,
    {
        self.core.subscribe(&target, true, Rc::new(RefCell::new(listener)))
    }

    pub fn off(&self, target: Target<T::Id>, listener: Option<ListenerId>) -> Result<usize> {
        self.core.unsubscribe(&target, listener)
    }

    pub fn listener_count(&self, target: Target<T::Id>) -> Result<usize> {
        self.core.listener_count(&target)
    }
}

impl<T: Identify> fmt::Debug for IntervalTimeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalTimeline")
            .field("start_field", &self.start_field)
            .field("end_field", &self.end_field)
            .field("len", &self.members.len())
            .field("core", &self.core)
            .finish()
    }
}

impl<'a, T: Identify> IntoIterator for &'a IntervalTimeline<T> {
    type Item = &'a T;
    type IntoIter = Items<'a, T, DayRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Identify> Extend<T> for IntervalTimeline<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.add_many(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheOptions;
    use chrono::NaiveDate;

    #[derive(Debug, Clone, PartialEq)]
    struct Booking {
        id: u32,
        from: Option<RawDate>,
        to: Option<RawDate>,
    }

    impl Identify for Booking {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn booking(id: u32, from: &str, to: &str) -> Booking {
        Booking {
            id,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    fn day(d: u32) -> Midnight {
        Midnight::of_date(NaiveDate::from_ymd_opt(2025, 10, d).unwrap()).unwrap()
    }

    fn timeline() -> IntervalTimeline<Booking> {
        IntervalTimeline::with_options(
            DateField::new("from", |b: &Booking| b.from.clone()),
            DateField::new("to", |b: &Booking| b.to.clone()),
            TimelineOptions::new().with_cache(CacheOptions::local()),
        )
    }

    fn ids(items: Vec<&Booking>) -> Vec<u32> {
        let mut ids: Vec<_> = items.into_iter().map(|b| b.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_add_fills_every_day() {
        let mut t = timeline();
        assert!(t.add(booking(1, "2025-10-10", "2025-10-14")));
        assert_eq!(t.days_count(), 5);
        assert_eq!(t.get_range(&1), Some(DayRange::new(day(10), day(14))));
        for d in 10..=14 {
            assert_eq!(ids(t.get(day(d)).unwrap()), vec![1]);
        }
        assert!(t.get(day(15)).unwrap().is_empty());
    }

    #[test]
    fn test_inverted_range_is_swapped() {
        let mut t = timeline();
        t.add(booking(1, "2025-10-20", "2025-10-10"));
        assert_eq!(t.get_range(&1), Some(DayRange::new(day(10), day(20))));
        assert_eq!(t.start_at(), Some(day(10)));
    }

    #[test]
    fn test_shift_only_touches_edges() {
        let mut t = timeline();
        t.add(booking(1, "2025-10-10", "2025-10-14"));
        let touched = Rc::new(RefCell::new(Vec::new()));
        for d in 9..=16 {
            let log = Rc::clone(&touched);
            t.on(Target::date(day(d)), move |_| {
                log.borrow_mut().push(d);
                Ok(())
            })
            .unwrap();
        }

        assert!(!t.add(booking(1, "2025-10-11", "2025-10-15")));

        assert_eq!(*touched.borrow(), vec![10, 15]);
        assert_eq!(t.bounds(), Some(DayRange::new(day(11), day(15))));
        assert!(t.get(day(10)).unwrap().is_empty());
    }

    #[test]
    fn test_item_event_carries_previous_range() {
        let mut t = timeline();
        t.add(booking(1, "2025-10-10", "2025-10-12"));
        let events = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&events);
        t.on(Target::item(1), move |event| {
            if let TimelineEvent::Item { change, .. } = event {
                log.borrow_mut().push(*change);
            }
            Ok(())
        })
        .unwrap();

        t.add(booking(1, "2025-10-10", "2025-10-15"));

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_resized());
        assert_eq!(events[0].prev_end_at, Some(day(12)));
        assert_eq!(events[0].end_at, Some(day(15)));
    }

    #[test]
    fn test_range_query_is_deduplicated() {
        let mut t = timeline();
        t.add_many(vec![
            booking(1, "2025-10-01", "2025-10-31"),
            booking(2, "2025-10-05", "2025-10-06"),
            booking(3, "2025-10-20", "2025-10-22"),
        ]);
        let found = t
            .get_between("2025-10-04", "2025-10-10", &QueryOptions::new())
            .unwrap();
        assert_eq!(ids(found), vec![1, 2]);
        assert!(t
            .get_between("2025-10-10", "2025-10-04", &QueryOptions::new())
            .unwrap()
            .is_empty());

        let sorted: Vec<_> = t
            .get_all(&QueryOptions::new().sorted())
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_ranges_clips_intersection() {
        let mut t = timeline();
        t.add(booking(1, "2025-10-10", "2025-10-20"));
        let matches = t
            .get_ranges("2025-10-15", Some("2025-10-25".into()), &QueryOptions::new())
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].range, DayRange::new(day(10), day(20)));
        assert_eq!(matches[0].intersection, DayRange::new(day(15), day(20)));

        let single = t.get_ranges("2025-10-12", None, &QueryOptions::new()).unwrap();
        assert_eq!(single[0].intersection, DayRange::single(day(12)));
    }

    #[test]
    fn test_get_with_sorts_and_paginates_day() {
        let mut t = timeline();
        t.add_many(vec![
            booking(1, "2025-10-05", "2025-10-12"),
            booking(2, "2025-10-01", "2025-10-10"),
            booking(3, "2025-10-08", "2025-10-09"),
        ]);
        let sorted: Vec<_> = t
            .get_with("2025-10-08", &QueryOptions::new().sorted())
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(sorted, vec![2, 1, 3]);

        let page: Vec<_> = t
            .get_with("2025-10-08", &QueryOptions::new().sorted().offset(1).limit(1))
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(page, vec![1]);
    }

    #[test]
    fn test_starts_and_ends_on() {
        let mut t = timeline();
        t.add_many(vec![
            booking(1, "2025-10-10", "2025-10-12"),
            booking(2, "2025-10-12", "2025-10-14"),
        ]);
        assert_eq!(ids(t.get_starts_on("2025-10-12").unwrap()), vec![2]);
        assert_eq!(ids(t.get_ends_on("2025-10-12").unwrap()), vec![1]);
        assert_eq!(ids(t.get("2025-10-12").unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_add_many_update_and_remove() {
        let mut t = timeline();
        t.add_many(vec![
            booking(1, "2025-10-01", "2025-10-03"),
            booking(2, "2025-10-02", "2025-10-04"),
        ]);
        let outcome = t.add_many(vec![
            booking(1, "2025-10-02", "2025-10-05"),
            Booking {
                id: 2,
                from: Some("2025-10-02".into()),
                to: None,
            },
            booking(3, "2025-10-09", "2025-10-09"),
        ]);
        assert_eq!(
            outcome,
            BatchOutcome {
                added: 1,
                updated: 1,
                removed: 1
            }
        );
        assert!(t.get(day(1)).unwrap().is_empty());
        assert_eq!(ids(t.get(day(5)).unwrap()), vec![1]);
        assert!(!t.has(&2));
        assert_eq!(t.bounds(), Some(DayRange::new(day(2), day(9))));
        assert_eq!(t.days_count(), 5);
    }

    #[test]
    fn test_delete_many_walks_whole_range() {
        let mut t = timeline();
        t.add_many(vec![
            booking(1, "2025-10-01", "2025-10-10"),
            booking(2, "2025-10-05", "2025-10-06"),
        ]);
        assert_eq!(t.delete_many([1u32, 7]), 1);
        assert_eq!(t.dates(), vec![day(5), day(6)]);
        assert!(t.delete(&2));
        assert!(t.is_empty());
        assert_eq!(t.bounds(), None);
    }

    #[test]
    fn test_unique_only_days() {
        let mut t = timeline();
        t.add_many(vec![
            booking(1, "2025-10-01", "2025-10-03"),
            booking(2, "2025-10-02", "2025-10-02"),
        ]);
        let sizes: Vec<_> = t
            .days(&DayQueryOptions::new().unique_only())
            .map(|d| d.size())
            .collect();
        assert_eq!(sizes, vec![1, 1, 0]);
        let sizes: Vec<_> = t.days(&DayQueryOptions::new()).map(|d| d.size()).collect();
        assert_eq!(sizes, vec![1, 2, 1]);
    }
}
