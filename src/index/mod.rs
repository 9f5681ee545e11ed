//! Day index engine shared by the timelines

pub mod bucket;
pub mod day_index;
pub mod listeners;

pub use bucket::*;
pub use day_index::*;
pub use listeners::{Callback, ListenerKey, Listeners};
