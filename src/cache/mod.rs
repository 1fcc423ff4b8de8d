//! Kernel cache implementation
//!
//! LRU cache for kernel matrix values. When a kernel is bound to the same
//! feature set on both sides the matrix is symmetric and only K(i,j) with
//! i <= j is stored; for distinct sides the key keeps its orientation.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::core::Result;

/// Cache key for kernel values, normalized so that i <= j when symmetric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    i: usize,
    j: usize,
}

impl CacheKey {
    fn new(i: usize, j: usize, symmetric: bool) -> Self {
        if !symmetric || i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }
}

/// LRU cache for kernel matrix values
pub struct KernelCache {
    cache: LruCache<CacheKey, f64>,
    symmetric: bool,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a new kernel cache with specified capacity in number of entries
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            symmetric: false,
            hits: 0,
            misses: 0,
        }
    }

    /// Whether (i, j) and (j, i) share one entry
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Get a kernel value from cache
    pub fn get(&mut self, i: usize, j: usize) -> Option<f64> {
        let key = CacheKey::new(i, j, self.symmetric);
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Put a kernel value into cache
    pub fn put(&mut self, i: usize, j: usize, value: f64) {
        let key = CacheKey::new(i, j, self.symmetric);
        self.cache.put(key, value);
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }

    /// Drop every cached value and switch key orientation for the next binding
    pub fn reset(&mut self, symmetric: bool) {
        self.cache.clear();
        self.symmetric = symmetric;
        self.hits = 0;
        self.misses = 0;
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        let symmetric = self.symmetric;
        self.reset(symmetric);
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

/// Optional kernel cache shared behind `&self` evaluation
///
/// A size of zero disables caching entirely; lookups then always compute.
pub struct SharedKernelCache {
    inner: Option<Mutex<KernelCache>>,
}

impl SharedKernelCache {
    /// Cache holding up to `size` entries, or none at all for zero
    pub fn new(size: usize) -> Self {
        Self {
            inner: (size > 0).then(|| Mutex::new(KernelCache::new(size))),
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Return the cached value for (i, j) or compute and remember it
    pub fn get_or_compute<F>(&self, i: usize, j: usize, compute: F) -> Result<f64>
    where
        F: FnOnce() -> Result<f64>,
    {
        let Some(lock) = &self.inner else {
            return compute();
        };

        // A poisoned cache only holds plain floats, so keep using it
        if let Some(value) = lock.lock().unwrap_or_else(|e| e.into_inner()).get(i, j) {
            return Ok(value);
        }

        let value = compute()?;
        lock.lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(i, j, value);
        Ok(value)
    }

    /// Invalidate every cached value
    pub fn reset(&self, symmetric: bool) {
        if let Some(lock) = &self.inner {
            lock.lock()
                .unwrap_or_else(|e| e.into_inner())
                .reset(symmetric);
        }
    }

    pub fn stats(&self) -> Option<CacheStats> {
        self.inner
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(|e| e.into_inner()).stats())
    }
}

impl std::fmt::Debug for SharedKernelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKernelCache")
            .field("stats", &self.stats())
            .finish()
    }
}
