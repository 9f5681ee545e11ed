//! Query options and read-only views

pub mod options;

pub use options::*;

use crate::core::temporal::Midnight;

/// Items of one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct Day<'a, T> {
    pub at: Midnight,
    pub items: Vec<&'a T>,
}

impl<'a, T> Day<'a, T> {
    pub fn new(at: Midnight, items: Vec<&'a T>) -> Self {
        Self { at, items }
    }

    /// A day without items
    pub fn empty(at: Midnight) -> Self {
        Self {
            at,
            items: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
