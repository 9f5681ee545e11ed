//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use temporal_days::prelude::*;

/// Install a test-writer subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Item with a single optional date
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub at: Option<RawDate>,
}

impl Identify for Note {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }
}

pub fn note(id: &str, at: impl Into<RawDate>) -> Note {
    Note {
        id: id.to_string(),
        at: Some(at.into()),
    }
}

/// Item with a start and an end date
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub id: u32,
    pub start: Option<RawDate>,
    pub end: Option<RawDate>,
}

impl Identify for Span {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

pub fn span(id: u32, start: impl Into<RawDate>, end: impl Into<RawDate>) -> Span {
    Span {
        id,
        start: Some(start.into()),
        end: Some(end.into()),
    }
}

pub fn options() -> TimelineOptions {
    TimelineOptions::new().with_cache(CacheOptions::local())
}

pub fn notes() -> PointTimeline<Note> {
    PointTimeline::with_options(DateField::new("at", |n: &Note| n.at.clone()), options())
}

pub fn spans() -> IntervalTimeline<Span> {
    IntervalTimeline::with_options(
        DateField::new("start", |s: &Span| s.start.clone()),
        DateField::new("end", |s: &Span| s.end.clone()),
        options(),
    )
}

/// Calendar day `offset` days after 2025-01-01
pub fn date(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.checked_add_days(chrono::Days::new(offset as u64)))
        .unwrap()
}

pub fn midnight(offset: u32) -> Midnight {
    Midnight::of_date(date(offset)).unwrap()
}
