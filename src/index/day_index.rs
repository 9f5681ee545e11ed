//! Ordered day index shared by point and interval timelines

use crate::config::TimelineOptions;
use crate::core::cache::DateNormalizer;
use crate::core::date::RawDate;
use crate::core::event::{BoundsChange, DayChange, ListenerId, Target, TimelineEvent};
use crate::core::temporal::{DayRange, Midnight};
use crate::error::{Error, Result};
use crate::index::bucket::DayBucket;
use crate::index::listeners::{Callback, ListenerKey, Listeners};
use crate::query::{DayQueryOptions, Direction};
use hashbrown::HashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::Hash;
use std::ops::Bound;

/// Day buckets ordered by day, cached bounds, date normalization and
/// listeners.
///
/// A day is present in `days` exactly when its bucket holds at least one
/// item. `bounds` always mirrors the first and last key of `days`.
pub struct DayIndexCore<Id, C> {
    days: BTreeMap<Midnight, DayBucket<Id>>,
    bounds: Option<DayRange>,
    dates: DateNormalizer,
    listeners: Listeners<Id, C>,
}

impl<Id, C> fmt::Debug for DayIndexCore<Id, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DayIndexCore")
            .field("days", &self.days.len())
            .field("bounds", &self.bounds)
            .field("dates", &self.dates)
            .finish()
    }
}

impl<Id: Eq + Hash + Clone + fmt::Debug, C> DayIndexCore<Id, C> {
    pub fn new(options: &TimelineOptions) -> Self {
        Self {
            days: BTreeMap::new(),
            bounds: None,
            dates: DateNormalizer::new(&options.cache),
            listeners: Listeners::new(),
        }
    }

    /// Day key of `raw`, or `None` when it cannot be resolved
    pub fn normalize(&self, raw: &RawDate) -> Option<Midnight> {
        self.dates.normalize(raw)
    }

    /// Day key of a required query argument
    pub fn resolve(&self, raw: &RawDate) -> Result<Midnight> {
        self.normalize(raw).ok_or_else(|| Error::invalid_date(raw))
    }

    /// Inclusive range of two required query arguments, or `None` when the
    /// start lies after the end
    pub fn resolve_range(&self, start: &RawDate, end: &RawDate) -> Result<Option<DayRange>> {
        let start_at = self.resolve(start)?;
        let end_at = self.resolve(end)?;
        Ok((start_at <= end_at).then_some(DayRange { start_at, end_at }))
    }

    pub fn bucket(&self, day: &Midnight) -> Option<&DayBucket<Id>> {
        self.days.get(day)
    }

    /// Item count of a day
    pub fn day_len(&self, day: &Midnight) -> usize {
        self.days.get(day).map_or(0, DayBucket::len)
    }

    pub fn insert(&mut self, day: Midnight, id: Id) {
        self.days.entry(day).or_default().push(id);
    }

    /// Remove `id` from the day, dropping the bucket once empty
    pub fn remove(&mut self, day: &Midnight, id: &Id) -> bool {
        let Some(bucket) = self.days.get_mut(day) else {
            return false;
        };
        let removed = bucket.remove(id);
        if bucket.is_empty() {
            self.days.remove(day);
        }
        removed
    }

    /// Apply a batch to one day: removals first, then additions.
    /// Returns the resulting item count.
    pub fn patch(&mut self, day: Midnight, remove: Option<&HashSet<Id>>, add: Vec<Id>) -> usize {
        let bucket = self.days.entry(day).or_default();
        if let Some(ids) = remove.filter(|ids| !ids.is_empty()) {
            bucket.remove_all(ids);
        }
        for id in add {
            bucket.push(id);
        }
        let len = bucket.len();
        if len == 0 {
            self.days.remove(&day);
        }
        len
    }

    pub fn bounds(&self) -> Option<DayRange> {
        self.bounds
    }

    pub fn start_at(&self) -> Option<Midnight> {
        self.bounds.map(|b| b.start_at)
    }

    pub fn end_at(&self) -> Option<Midnight> {
        self.bounds.map(|b| b.end_at)
    }

    /// Number of days holding at least one item
    pub fn days_count(&self) -> usize {
        self.days.len()
    }

    /// Refresh cached bounds from the tree; returns a bounds event when they moved
    pub fn recompute_bounds(&mut self) -> Option<TimelineEvent<Id, C>> {
        let bounds = match (self.days.first_key_value(), self.days.last_key_value()) {
            (Some((start_at, _)), Some((end_at, _))) => Some(DayRange {
                start_at: *start_at,
                end_at: *end_at,
            }),
            _ => None,
        };
        if bounds == self.bounds {
            return None;
        }
        self.bounds = bounds;
        Some(TimelineEvent::Bounds(BoundsChange {
            start_at: bounds.map(|b| b.start_at),
            end_at: bounds.map(|b| b.end_at),
        }))
    }

    /// Existing day keys in `[start, end]`, ascending; empty when `start > end`
    pub fn range_keys(&self, start: Midnight, end: Midnight) -> impl Iterator<Item = Midnight> + '_ {
        self.range_buckets(start, end).map(|(day, _)| day)
    }

    /// Existing days in `[start, end]` with their buckets
    pub fn range_buckets(
        &self,
        start: Midnight,
        end: Midnight,
    ) -> impl Iterator<Item = (Midnight, &DayBucket<Id>)> + '_ {
        let range = (start <= end).then(|| self.days.range(start..=end));
        range.into_iter().flatten().map(|(day, bucket)| (*day, bucket))
    }

    /// All days with their buckets, ascending
    pub fn buckets(&self) -> impl Iterator<Item = (Midnight, &DayBucket<Id>)> + '_ {
        self.days.iter().map(|(day, bucket)| (*day, bucket))
    }

    /// Nearest existing day to `day` in `direction`, `day` itself when present.
    ///
    /// With [`Direction::Either`], equal distances resolve to the earlier day.
    pub fn closest(&self, day: Midnight, direction: Direction) -> Option<Midnight> {
        if self.days.contains_key(&day) {
            return Some(day);
        }
        let before = || self.days.range(..day).next_back().map(|(d, _)| *d);
        let after = || {
            self.days
                .range((Bound::Excluded(day), Bound::Unbounded))
                .next()
                .map(|(d, _)| *d)
        };
        match direction {
            Direction::Before => before(),
            Direction::After => after(),
            Direction::Either => match (before(), after()) {
                (Some(b), Some(a)) => {
                    if b.days_until(day) <= day.days_until(a) {
                        Some(b)
                    } else {
                        Some(a)
                    }
                }
                (b, a) => b.or(a),
            },
        }
    }

    /// Days of `range` in ascending order, paginated by `options`.
    ///
    /// Without `include_empty` only days holding items are walked through the
    /// tree. With it every calendar day of the range is produced, the bucket
    /// being `None` for days without items.
    pub fn walk_days(
        &self,
        range: DayRange,
        options: &DayQueryOptions,
    ) -> Box<dyn Iterator<Item = (Midnight, Option<&DayBucket<Id>>)> + '_> {
        let limit = options.limit.unwrap_or(usize::MAX);
        if !options.include_empty {
            return Box::new(
                self.range_buckets(range.start_at, range.end_at)
                    .skip(options.offset)
                    .take(limit)
                    .map(|(day, bucket)| (day, Some(bucket))),
            );
        }
        let remaining = range.len_days().saturating_sub(options.offset as u64);
        let first = range.start_at.add_days(options.offset as u64);
        let days = first
            .filter(|_| remaining > 0)
            .map(|start_at| DayRange {
                start_at,
                end_at: range.end_at,
            })
            .into_iter()
            .flat_map(|r| r.days())
            .take(limit.min(usize::try_from(remaining).unwrap_or(usize::MAX)));
        Box::new(days.map(move |day| (day, self.days.get(&day))))
    }

    /// Finish a mutation: build day events for `touched` days, append
    /// `item_events`, refresh bounds, dispatch, then drop listeners of days
    /// that became empty and of `deleted` items.
    pub fn commit(
        &mut self,
        touched: BTreeSet<Midnight>,
        item_events: Vec<TimelineEvent<Id, C>>,
        deleted: &[Id],
    ) {
        let mut events: Vec<TimelineEvent<Id, C>> = touched
            .iter()
            .map(|day| {
                TimelineEvent::Date(DayChange {
                    at: *day,
                    size: self.day_len(day),
                })
            })
            .collect();
        events.extend(item_events);
        if let Some(bounds) = self.recompute_bounds() {
            events.push(bounds);
        }
        self.emit(&events);

        for day in touched.iter().filter(|day| !self.days.contains_key(*day)) {
            self.listeners.unsubscribe(&ListenerKey::Day(*day), None);
        }
        for id in deleted {
            self.listeners.unsubscribe(&ListenerKey::Item(id.clone()), None);
        }
    }

    pub fn emit(&self, events: &[TimelineEvent<Id, C>]) {
        self.listeners.emit(events);
    }

    fn listener_key(&self, target: &Target<Id>) -> Result<ListenerKey<Id>> {
        Ok(match target {
            Target::Bounds => ListenerKey::Bounds,
            Target::Date(raw) => ListenerKey::Day(self.resolve(raw)?),
            Target::Item(id) => ListenerKey::Item(id.clone()),
        })
    }

    pub fn subscribe(
        &self,
        target: &Target<Id>,
        once: bool,
        callback: Callback<TimelineEvent<Id, C>>,
    ) -> Result<ListenerId> {
        let key = self.listener_key(target)?;
        Ok(self.listeners.subscribe(key, once, callback))
    }

    pub fn unsubscribe(&self, target: &Target<Id>, listener: Option<ListenerId>) -> Result<usize> {
        let key = self.listener_key(target)?;
        Ok(self.listeners.unsubscribe(&key, listener))
    }

    pub fn listener_count(&self, target: &Target<Id>) -> Result<usize> {
        let key = self.listener_key(target)?;
        Ok(self.listeners.count(&key))
    }
}
