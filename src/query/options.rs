//! Per-query options

use serde::{Deserialize, Serialize};

/// Pagination and ordering of item queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryOptions {
    /// Maximum number of results; unbounded when `None`
    pub limit: Option<usize>,
    /// Results skipped before the first returned one
    pub offset: usize,
    /// Chronological order instead of storage order
    pub sorted: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    /// Apply offset and limit to an iterator
    pub fn paginate<I: Iterator>(&self, iter: I) -> impl Iterator<Item = I::Item> {
        iter.skip(self.offset).take(self.limit.unwrap_or(usize::MAX))
    }
}

/// Options of day traversals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DayQueryOptions {
    pub limit: Option<usize>,
    pub offset: usize,
    /// Also yield days without items
    pub include_empty: bool,
    /// Report each item only on the first day it appears in the traversal
    pub unique_only: bool,
}

impl DayQueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn include_empty(mut self) -> Self {
        self.include_empty = true;
        self
    }

    pub fn unique_only(mut self) -> Self {
        self.unique_only = true;
        self
    }
}

/// Side searched by `get_closest_day`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Before,
    After,
    /// Nearest on either side; the earlier day wins a tie
    #[default]
    Either,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let page: Vec<_> = QueryOptions::new().offset(2).limit(3).paginate(0..10).collect();
        assert_eq!(page, vec![2, 3, 4]);
        let all: Vec<_> = QueryOptions::new().paginate(0..4).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_options_from_json() {
        let options: QueryOptions = serde_json::from_str(r#"{"limit": 5, "sorted": true}"#).unwrap();
        assert_eq!(options, QueryOptions::new().limit(5).sorted());
        let days: DayQueryOptions = serde_json::from_str(r#"{"includeEmpty": true}"#).unwrap();
        assert!(days.include_empty);
        assert!(!days.unique_only);
    }
}
