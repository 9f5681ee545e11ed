//! Temporal data types and day arithmetic

use chrono::{DateTime, Days, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp representing a point in time with millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Milliseconds since Unix epoch
    millis: i64,
}

impl Timestamp {
    /// Create a timestamp from milliseconds since Unix epoch
    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Create a timestamp from seconds since Unix epoch
    pub fn from_secs(secs: i64) -> Self {
        Self {
            millis: secs.saturating_mul(1_000),
        }
    }

    /// Get current timestamp
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Get milliseconds since Unix epoch
    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Get seconds since Unix epoch
    pub fn as_secs(&self) -> i64 {
        self.millis.div_euclid(1_000)
    }

    /// Convert to chrono DateTime in UTC
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.millis)
    }

    /// Convert to chrono DateTime in the local timezone
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.millis).earliest()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.millis),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self {
            millis: dt.timestamp_millis(),
        }
    }
}

/// Local-timezone midnight of one calendar day.
///
/// This is the key of the day index. Two instants on the same local calendar
/// day always map to the same `Midnight`. Ordering follows the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Midnight {
    at: Timestamp,
    date: NaiveDate,
}

impl Midnight {
    /// Local midnight of a calendar date.
    ///
    /// Returns `None` only when the date lies outside the representable range.
    /// On days where a DST transition skips midnight, the first valid instant
    /// of the day is used.
    pub fn of_date(date: NaiveDate) -> Option<Self> {
        let naive = date.and_time(NaiveTime::MIN);
        let dt = match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                let shifted = naive.checked_add_signed(Duration::hours(1))?;
                Local.from_local_datetime(&shifted).earliest()?
            }
        };
        Some(Self {
            at: Timestamp::from(dt),
            date,
        })
    }

    /// Local midnight of the calendar day containing `ts`.
    pub fn of_instant(ts: Timestamp) -> Option<Self> {
        let local = ts.to_local()?;
        let date = local.date_naive();
        if local.time() == NaiveTime::MIN {
            return Some(Self { at: ts, date });
        }
        Self::of_date(date)
    }

    /// Midnight of today in the local timezone
    pub fn today() -> Option<Self> {
        Self::of_date(Local::now().date_naive())
    }

    /// Timestamp of this midnight
    pub fn timestamp(&self) -> Timestamp {
        self.at
    }

    /// Milliseconds since Unix epoch
    pub fn as_millis(&self) -> i64 {
        self.at.as_millis()
    }

    /// Local calendar date
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The following calendar day
    pub fn next(&self) -> Option<Self> {
        Self::of_date(self.date.succ_opt()?)
    }

    /// The preceding calendar day
    pub fn prev(&self) -> Option<Self> {
        Self::of_date(self.date.pred_opt()?)
    }

    /// `n` calendar days later
    pub fn add_days(&self, n: u64) -> Option<Self> {
        Self::of_date(self.date.checked_add_days(Days::new(n))?)
    }

    /// Signed number of calendar days from `self` to `other`
    pub fn days_until(&self, other: Midnight) -> i64 {
        other.date.signed_duration_since(self.date).num_days()
    }
}

impl fmt::Display for Midnight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date)
    }
}

/// Inclusive range of days `[start_at, end_at]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DayRange {
    pub start_at: Midnight,
    pub end_at: Midnight,
}

impl DayRange {
    /// Create a range; inverted bounds are swapped
    pub fn new(a: Midnight, b: Midnight) -> Self {
        if a <= b {
            Self {
                start_at: a,
                end_at: b,
            }
        } else {
            Self {
                start_at: b,
                end_at: a,
            }
        }
    }

    /// A range covering a single day
    pub fn single(day: Midnight) -> Self {
        Self {
            start_at: day,
            end_at: day,
        }
    }

    /// Check if a day is within this range
    pub fn contains(&self, day: Midnight) -> bool {
        self.start_at <= day && day <= self.end_at
    }

    /// Check if two ranges share at least one day
    pub fn overlaps(&self, other: &DayRange) -> bool {
        self.start_at <= other.end_at && other.start_at <= self.end_at
    }

    /// Days common to both ranges
    pub fn intersection(&self, other: &DayRange) -> Option<DayRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(DayRange {
            start_at: self.start_at.max(other.start_at),
            end_at: self.end_at.min(other.end_at),
        })
    }

    /// Days of `self` that are not in `other`, as at most two sub-ranges
    /// (the part before `other` and the part after it).
    pub fn minus(&self, other: &DayRange) -> [Option<DayRange>; 2] {
        if !self.overlaps(other) {
            return [Some(*self), None];
        }
        let before = if self.start_at < other.start_at {
            other.start_at.prev().map(|end_at| DayRange {
                start_at: self.start_at,
                end_at,
            })
        } else {
            None
        };
        let after = if other.end_at < self.end_at {
            other.end_at.next().map(|start_at| DayRange {
                start_at,
                end_at: self.end_at,
            })
        } else {
            None
        };
        [before, after]
    }

    /// Number of calendar days covered
    pub fn len_days(&self) -> u64 {
        self.start_at.days_until(self.end_at).unsigned_abs() + 1
    }

    /// Every day of the range in ascending order
    pub fn days(&self) -> DayIter {
        DayIter {
            next: Some(self.start_at),
            end_at: self.end_at,
        }
    }
}

/// Ascending iterator over the days of a [`DayRange`]
#[derive(Debug, Clone)]
pub struct DayIter {
    next: Option<Midnight>,
    end_at: Midnight,
}

impl Iterator for DayIter {
    type Item = Midnight;

    fn next(&mut self) -> Option<Midnight> {
        let day = self.next.filter(|d| *d <= self.end_at)?;
        self.next = if day < self.end_at { day.next() } else { None };
        Some(day)
    }
}
