//! Compiled include-pattern cache, owned by a `SearchEngine`.
use super::include::IncludeRule;
use log::trace;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Bounded map from raw include token to its compiled rule.
///
/// The lock is never held while compiling, so two requests racing on the
/// same new token may both compile it; the second insert simply wins.
pub struct PatternCache {
    entries: Mutex<LruCache<String, Arc<IncludeRule>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_or_compile(&self, token: &str) -> Arc<IncludeRule> {
        if let Some(rule) = self.entries.lock().get(token) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("include cache hit: {token}");
            return Arc::clone(rule);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!("include cache miss: {token}");
        let rule = Arc::new(IncludeRule::compile(token));
        self.entries.lock().put(token.to_string(), Arc::clone(&rule));
        rule
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
