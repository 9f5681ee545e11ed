//! Core data types: day keys, raw dates, events, item identity

pub mod cache;
pub mod date;
pub mod event;
pub mod item;
pub mod temporal;

pub use cache::*;
pub use date::*;
pub use event::*;
pub use item::*;
pub use temporal::*;
