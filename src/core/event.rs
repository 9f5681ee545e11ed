//! Change events emitted by timelines

use crate::core::date::RawDate;
use crate::core::temporal::Midnight;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Handle returned by `on`/`once`, used to remove that one listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// The three event kinds a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Bounds,
    Date,
    Item,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Bounds => "bounds",
            EventKind::Date => "date",
            EventKind::Item => "item",
        }
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bounds" => Ok(EventKind::Bounds),
            "date" => Ok(EventKind::Date),
            "item" => Ok(EventKind::Item),
            other => Err(Error::UnknownEventKind(other.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a listener is registered on
#[derive(Debug, Clone, PartialEq)]
pub enum Target<Id> {
    /// Changes of the timeline's earliest/latest day
    Bounds,
    /// Changes to the items of one day
    Date(RawDate),
    /// Changes to one item
    Item(Id),
}

impl<Id> Target<Id> {
    pub fn date(date: impl Into<RawDate>) -> Self {
        Target::Date(date.into())
    }

    pub fn item(id: Id) -> Self {
        Target::Item(id)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Target::Bounds => EventKind::Bounds,
            Target::Date(_) => EventKind::Date,
            Target::Item(_) => EventKind::Item,
        }
    }
}

/// New bounds of the timeline; both `None` once it is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundsChange {
    pub start_at: Option<Midnight>,
    pub end_at: Option<Midnight>,
}

/// A day gained or lost items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayChange {
    pub at: Midnight,
    /// Item count of the day after the change
    pub size: usize,
}

/// Item change on a point timeline.
///
/// `prev_at` is `None` for a new item, `at` is `None` for a deleted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointChange {
    pub at: Option<Midnight>,
    pub prev_at: Option<Midnight>,
}

/// Item change on an interval timeline.
///
/// The previous fields are `None` for a new item; the current ones are `None`
/// for a deleted item. Comparing the four tells a move from a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeChange {
    pub start_at: Option<Midnight>,
    pub end_at: Option<Midnight>,
    pub prev_start_at: Option<Midnight>,
    pub prev_end_at: Option<Midnight>,
}

impl RangeChange {
    pub fn is_created(&self) -> bool {
        self.prev_start_at.is_none() && self.start_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.start_at.is_none() && self.prev_start_at.is_some()
    }

    /// Same length, different position
    pub fn is_moved(&self) -> bool {
        match (self.start_at, self.end_at, self.prev_start_at, self.prev_end_at) {
            (Some(s), Some(e), Some(ps), Some(pe)) => {
                s != ps && s.days_until(e) == ps.days_until(pe)
            }
            _ => false,
        }
    }

    /// Different length
    pub fn is_resized(&self) -> bool {
        match (self.start_at, self.end_at, self.prev_start_at, self.prev_end_at) {
            (Some(s), Some(e), Some(ps), Some(pe)) => s.days_until(e) != ps.days_until(pe),
            _ => false,
        }
    }
}

/// Event delivered to listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineEvent<Id, C> {
    Bounds(BoundsChange),
    Date(DayChange),
    Item { id: Id, change: C },
}

impl<Id, C> TimelineEvent<Id, C> {
    pub fn kind(&self) -> EventKind {
        match self {
            TimelineEvent::Bounds(_) => EventKind::Bounds,
            TimelineEvent::Date(_) => EventKind::Date,
            TimelineEvent::Item { .. } => EventKind::Item,
        }
    }
}
