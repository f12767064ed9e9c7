use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use crate::blueprint::options::Options;
use crate::query::ast::Query;
use crate::query::builder::BuiltPlan;

/// Optimized plans keyed by everything that shaped them. Cached plans are
/// immutable and shared; each execution materializes its own iterators.
pub struct PlanCache {
    pub cache: Mutex<LruCache<PlanKey, Arc<BuiltPlan>>>,
    pub size_limit: usize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct PlanKey {
    pub query: Query,
    pub docid_limit: u32,
    pub strict: bool,
    pub options: Options,
}

impl PlanCache {
    pub fn new(size_limit: usize) -> Self {
        let cap = NonZeroUsize::new(size_limit).unwrap_or(NonZeroUsize::MIN);
        PlanCache {
            cache: Mutex::new(LruCache::new(cap)),
            size_limit,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, key: &PlanKey) -> Option<Arc<BuiltPlan>> {
        let mut cache = self.cache.lock();
        if let Some(plan) = cache.get(key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            debug!(docid_limit = key.docid_limit, "plan cache hit");
            Some(plan.clone())
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            debug!(docid_limit = key.docid_limit, "plan cache miss");
            None
        }
    }

    pub fn put(&self, key: PlanKey, plan: Arc<BuiltPlan>) {
        self.cache.lock().put(key, plan);
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.cache.lock().len(),
            capacity: self.size_limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
