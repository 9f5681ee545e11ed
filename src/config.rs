//! Timeline construction options

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Default capacity of the raw-value tier of the date cache
pub const DEFAULT_DATE_CACHE_LIMIT: usize = 1000;

/// Default capacity of the instant tier of the date cache
pub const DEFAULT_DATE_SET_HOURS_CACHE_LIMIT: usize = 500;

/// Date normalization cache settings.
///
/// Deserializes from the documented camelCase option document, e.g.
/// `{"useGlobalCache": false, "dateCacheLimit": 200}`. Missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheOptions {
    /// Share the process-wide cache instead of owning one
    pub use_global_cache: bool,
    /// Entries keyed by raw text or number. Only applies to an owned cache;
    /// the shared cache is sized through `config_global_cache`.
    pub date_cache_limit: usize,
    /// Entries keyed by a Date-like instant; owned cache only, like
    /// `date_cache_limit`
    pub date_set_hours_cache_limit: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            use_global_cache: true,
            date_cache_limit: DEFAULT_DATE_CACHE_LIMIT,
            date_set_hours_cache_limit: DEFAULT_DATE_SET_HOURS_CACHE_LIMIT,
        }
    }
}

impl CacheOptions {
    /// Options for an instance-local cache with default limits
    pub fn local() -> Self {
        Self {
            use_global_cache: false,
            ..Self::default()
        }
    }

    pub fn with_date_cache_limit(mut self, limit: usize) -> Self {
        self.date_cache_limit = limit;
        self
    }

    pub fn with_date_set_hours_cache_limit(mut self, limit: usize) -> Self {
        self.date_set_hours_cache_limit = limit;
        self
    }
}

/// Options accepted by timeline constructors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineOptions {
    pub cache: CacheOptions,
}

impl TimelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let options = TimelineOptions::default();
        assert!(options.cache.use_global_cache);
        assert_eq!(options.cache.date_cache_limit, 1000);
        assert_eq!(options.cache.date_set_hours_cache_limit, 500);
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            TimelineOptions::from_json(r#"{"cache": {"useGlobalCache": false, "dateCacheLimit": 10}}"#)
                .unwrap();
        assert!(!options.cache.use_global_cache);
        assert_eq!(options.cache.date_cache_limit, 10);
        assert_eq!(options.cache.date_set_hours_cache_limit, 500);
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let err = TimelineOptions::from_json(r#"{"cache": {"ttl": 5}}"#).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
