//! Temporal-Days: in-memory day index for timestamped items
//!
//! Items are bucketed by local calendar day and kept in an ordered day tree,
//! so range, day and nearest-day queries only visit days that hold items.
//!
//! # Core Concepts
//!
//! - **Days**: every date is normalized to the local midnight of its day
//! - **Point timelines**: each item sits on the single day of one attribute
//! - **Interval timelines**: each item covers every day between two attributes
//! - **Events**: per-day, per-item and bounds listeners fire after each mutation
//!
//! # Example
//!
//! ```
//! use temporal_days::prelude::*;
//!
//! #[derive(Debug)]
//! struct Stay {
//!     guest: u32,
//!     arrival: &'static str,
//!     departure: &'static str,
//! }
//!
//! impl Identify for Stay {
//!     type Id = u32;
//!
//!     fn id(&self) -> u32 {
//!         self.guest
//!     }
//! }
//!
//! # fn example() -> temporal_days::error::Result<()> {
//! let mut stays = IntervalTimeline::new(
//!     DateField::new("arrival", |s: &Stay| Some(s.arrival.into())),
//!     DateField::new("departure", |s: &Stay| Some(s.departure.into())),
//! );
//! stays.add(Stay { guest: 7, arrival: "2025-03-01", departure: "2025-03-04" });
//!
//! assert_eq!(stays.get("2025-03-02")?.len(), 1);
//! assert_eq!(stays.days_count(), 4);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod index;
pub mod query;
pub mod timeline;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{CacheOptions, TimelineOptions};
    pub use crate::core::*;
    pub use crate::error::{Error, Result};
    pub use crate::query::{Day, DayQueryOptions, Direction, QueryOptions};
    pub use crate::timeline::*;
}
