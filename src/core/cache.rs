//! Bounded memoization of date normalization.
//!
//! Two tiers are kept: raw text/number inputs, and Date-like instants. Once a
//! tier reaches its limit new results are simply not stored; nothing is ever
//! evicted. The process-wide cache is created on first use and lives until the
//! process exits; [`config_global_cache`] resizes and clears it.

use crate::config::CacheOptions;
use crate::core::date::RawDate;
use crate::core::temporal::Midnight;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static GLOBAL_CACHE: OnceLock<Mutex<DateCache>> = OnceLock::new();

/// Memo from raw date inputs to their day key
#[derive(Debug, Default)]
pub struct DateCache {
    texts: HashMap<String, Midnight>,
    numbers: HashMap<u64, Midnight>,
    instants: HashMap<i64, Midnight>,
    raw_limit: usize,
    instant_limit: usize,
}

impl DateCache {
    pub fn new(raw_limit: usize, instant_limit: usize) -> Self {
        Self {
            raw_limit,
            instant_limit,
            ..Self::default()
        }
    }

    pub fn from_options(options: &CacheOptions) -> Self {
        Self::new(options.date_cache_limit, options.date_set_hours_cache_limit)
    }

    /// Resolve through the cache, computing and storing on a miss
    pub fn resolve(&mut self, raw: &RawDate) -> Option<Midnight> {
        match raw {
            RawDate::Instant(ts) => {
                let key = ts.as_millis();
                if let Some(day) = self.instants.get(&key) {
                    return Some(*day);
                }
                let day = raw.to_midnight()?;
                if self.instants.len() < self.instant_limit {
                    self.instants.insert(key, day);
                } else {
                    tracing::trace!(limit = self.instant_limit, "instant date cache full");
                }
                Some(day)
            }
            RawDate::Millis(ms) => {
                let key = ms.to_bits();
                if let Some(day) = self.numbers.get(&key) {
                    return Some(*day);
                }
                let day = raw.to_midnight()?;
                if self.raw_len() < self.raw_limit {
                    self.numbers.insert(key, day);
                } else {
                    tracing::trace!(limit = self.raw_limit, "raw date cache full");
                }
                Some(day)
            }
            RawDate::Text(text) => {
                if let Some(day) = self.texts.get(text.as_str()) {
                    return Some(*day);
                }
                let day = raw.to_midnight()?;
                if self.raw_len() < self.raw_limit {
                    self.texts.insert(text.clone(), day);
                } else {
                    tracing::trace!(limit = self.raw_limit, "raw date cache full");
                }
                Some(day)
            }
        }
    }

    fn raw_len(&self) -> usize {
        self.texts.len() + self.numbers.len()
    }

    /// Total number of cached entries across both tiers
    pub fn len(&self) -> usize {
        self.raw_len() + self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Change limits; existing entries above a new limit are kept until cleared
    pub fn set_limits(&mut self, raw_limit: usize, instant_limit: usize) {
        self.raw_limit = raw_limit;
        self.instant_limit = instant_limit;
    }

    pub fn clear(&mut self) {
        self.texts.clear();
        self.numbers.clear();
        self.instants.clear();
    }
}

fn global_cache() -> MutexGuard<'static, DateCache> {
    GLOBAL_CACHE
        .get_or_init(|| Mutex::new(DateCache::from_options(&CacheOptions::default())))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Apply new limits to the process-wide cache and clear it
pub fn config_global_cache(options: &CacheOptions) {
    let mut cache = global_cache();
    cache.set_limits(options.date_cache_limit, options.date_set_hours_cache_limit);
    cache.clear();
    tracing::debug!(
        date_cache_limit = options.date_cache_limit,
        date_set_hours_cache_limit = options.date_set_hours_cache_limit,
        "global date cache reconfigured"
    );
}

/// Drop every entry of the process-wide cache
pub fn clear_global_cache() {
    global_cache().clear();
}

/// Number of entries currently held by the process-wide cache
pub fn global_cache_len() -> usize {
    global_cache().len()
}

#[derive(Debug)]
enum CacheScope {
    Global,
    Local(RefCell<DateCache>),
}

/// Normalizes raw dates through either the shared or an owned cache
#[derive(Debug)]
pub struct DateNormalizer {
    scope: CacheScope,
}

impl DateNormalizer {
    pub fn new(options: &CacheOptions) -> Self {
        let scope = if options.use_global_cache {
            let defaults = CacheOptions::default();
            if options.date_cache_limit != defaults.date_cache_limit
                || options.date_set_hours_cache_limit != defaults.date_set_hours_cache_limit
            {
                tracing::debug!(
                    date_cache_limit = options.date_cache_limit,
                    date_set_hours_cache_limit = options.date_set_hours_cache_limit,
                    "cache limits ignored for the global cache, use config_global_cache"
                );
            }
            CacheScope::Global
        } else {
            CacheScope::Local(RefCell::new(DateCache::from_options(options)))
        };
        Self { scope }
    }

    /// Day key of `raw`, or `None` when it cannot be resolved
    pub fn normalize(&self, raw: &RawDate) -> Option<Midnight> {
        match &self.scope {
            CacheScope::Global => global_cache().resolve(raw),
            CacheScope::Local(cache) => cache.borrow_mut().resolve(raw),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.scope, CacheScope::Global)
    }

    /// Number of entries in the cache this normalizer reads from
    pub fn cache_len(&self) -> usize {
        match &self.scope {
            CacheScope::Global => global_cache_len(),
            CacheScope::Local(cache) => cache.borrow().len(),
        }
    }

    /// Clear an owned cache; the shared cache is only cleared explicitly
    pub fn clear(&self) {
        if let CacheScope::Local(cache) = &self.scope {
            cache.borrow_mut().clear();
        }
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(&CacheOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::temporal::Timestamp;

    #[test]
    fn test_cache_hits_return_same_day() {
        let mut cache = DateCache::new(10, 10);
        let first = cache.resolve(&RawDate::from("2025-10-20"));
        let second = cache.resolve(&RawDate::from("2025-10-20"));
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_stops_growing_at_limit() {
        let mut cache = DateCache::new(2, 1);
        for day in 1..=5 {
            let raw = RawDate::from(format!("2025-10-{day:02}"));
            assert!(cache.resolve(&raw).is_some());
        }
        cache.resolve(&RawDate::from(Timestamp::from_secs(1_700_000_000)));
        cache.resolve(&RawDate::from(Timestamp::from_secs(1_700_100_000)));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_invalid_inputs_are_not_cached() {
        let mut cache = DateCache::new(10, 10);
        assert_eq!(cache.resolve(&RawDate::from("nope")), None);
        assert_eq!(cache.resolve(&RawDate::from(f64::NAN)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_local_normalizer_is_isolated() {
        let normalizer = DateNormalizer::new(&CacheOptions::local());
        assert!(!normalizer.is_global());
        normalizer.normalize(&RawDate::from("2031-01-02"));
        assert_eq!(normalizer.cache_len(), 1);
        normalizer.clear();
        assert_eq!(normalizer.cache_len(), 0);
    }
}
