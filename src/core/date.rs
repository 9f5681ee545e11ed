//! Raw date inputs and their resolution to a calendar day

use crate::core::temporal::{Midnight, Timestamp};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;

/// Text layouts accepted for naive (zone-less) date-times, read as local time
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Text layouts accepted for plain calendar dates
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// A date value as found on an item or passed to a query, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDate {
    /// A Date-like instant
    Instant(Timestamp),
    /// A numeric timestamp in milliseconds since Unix epoch; may be NaN
    Millis(f64),
    /// A textual date (RFC 3339, `YYYY-MM-DD`, or a local date-time)
    Text(String),
}

impl RawDate {
    /// Resolve to the local midnight of the day this value falls on.
    ///
    /// Returns `None` for NaN/infinite numbers, out-of-range instants and
    /// unparseable text.
    pub fn to_midnight(&self) -> Option<Midnight> {
        match self {
            RawDate::Instant(ts) => Midnight::of_instant(*ts),
            RawDate::Millis(ms) => {
                if !ms.is_finite() {
                    return None;
                }
                Midnight::of_instant(Timestamp::from_millis(ms.trunc() as i64))
            }
            RawDate::Text(text) => parse_text(text),
        }
    }
}

fn parse_text(text: &str) -> Option<Midnight> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Midnight::of_instant(Timestamp::from(dt));
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Midnight::of_date(date);
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            let local = Local.from_local_datetime(&naive).earliest()?;
            return Midnight::of_instant(Timestamp::from(local));
        }
    }
    None
}

impl fmt::Display for RawDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDate::Instant(ts) => write!(f, "{ts}"),
            RawDate::Millis(ms) => write!(f, "{ms}"),
            RawDate::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<Timestamp> for RawDate {
    fn from(ts: Timestamp) -> Self {
        RawDate::Instant(ts)
    }
}

impl From<Midnight> for RawDate {
    fn from(day: Midnight) -> Self {
        RawDate::Instant(day.timestamp())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for RawDate {
    fn from(dt: DateTime<Tz>) -> Self {
        RawDate::Instant(Timestamp::from(dt))
    }
}

impl From<NaiveDate> for RawDate {
    fn from(date: NaiveDate) -> Self {
        match Midnight::of_date(date) {
            Some(day) => day.into(),
            None => RawDate::Millis(f64::NAN),
        }
    }
}

impl From<NaiveDateTime> for RawDate {
    fn from(naive: NaiveDateTime) -> Self {
        match Local.from_local_datetime(&naive).earliest() {
            Some(dt) => dt.into(),
            None => RawDate::Millis(f64::NAN),
        }
    }
}

impl From<i64> for RawDate {
    fn from(ms: i64) -> Self {
        RawDate::Instant(Timestamp::from_millis(ms))
    }
}

impl From<f64> for RawDate {
    fn from(ms: f64) -> Self {
        RawDate::Millis(ms)
    }
}

impl From<&str> for RawDate {
    fn from(text: &str) -> Self {
        RawDate::Text(text.to_string())
    }
}

impl From<String> for RawDate {
    fn from(text: String) -> Self {
        RawDate::Text(text)
    }
}

impl From<&RawDate> for RawDate {
    fn from(raw: &RawDate) -> Self {
        raw.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Midnight {
        Midnight::of_date(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(RawDate::from("2025-10-20").to_midnight(), Some(day(2025, 10, 20)));
        assert_eq!(RawDate::from("2025/10/20").to_midnight(), Some(day(2025, 10, 20)));
    }

    #[test]
    fn test_parse_local_datetime() {
        assert_eq!(
            RawDate::from("2025-10-20T23:59:59").to_midnight(),
            Some(day(2025, 10, 20))
        );
        assert_eq!(
            RawDate::from("2025-10-20 00:00:01.250").to_midnight(),
            Some(day(2025, 10, 20))
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(RawDate::from(f64::NAN).to_midnight(), None);
        assert_eq!(RawDate::from(f64::INFINITY).to_midnight(), None);
        assert_eq!(RawDate::from("").to_midnight(), None);
        assert_eq!(RawDate::from("not a date").to_midnight(), None);
        assert_eq!(RawDate::from("2025-13-45").to_midnight(), None);
    }

    #[test]
    fn test_same_day_inputs_agree() {
        let morning = NaiveDate::from_ymd_opt(2025, 10, 20)
            .unwrap()
            .and_hms_opt(6, 15, 0)
            .unwrap();
        let evening = NaiveDate::from_ymd_opt(2025, 10, 20)
            .unwrap()
            .and_hms_opt(21, 45, 30)
            .unwrap();
        assert_eq!(
            RawDate::from(morning).to_midnight(),
            RawDate::from(evening).to_midnight()
        );
        let millis = RawDate::from(morning).to_midnight().unwrap().as_millis() + 3_600_000;
        assert_eq!(
            RawDate::from(millis as f64).to_midnight(),
            Some(day(2025, 10, 20))
        );
    }
}
