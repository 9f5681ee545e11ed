//! Point and interval timelines

mod members;
pub mod interval;
pub mod point;

pub use interval::*;
pub use members::Items;
pub use point::*;

/// What a batch mutation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Items that were not present before
    pub added: usize,
    /// Present items whose day (or range) changed
    pub updated: usize,
    /// Present items dropped because their date became missing or invalid
    pub removed: usize,
}

impl BatchOutcome {
    /// Whether anything in the index changed
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}
