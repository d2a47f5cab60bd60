//! Render cache for incremental builds and watch mode.
//!
//! Remembers, per source file, a fingerprint of what was last generated so
//! an unchanged document is not compiled again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::hash::StableHasher;
use crate::render::{RenderConfig, StrongStyle};

// =============================================================================
// Fingerprint
// =============================================================================

/// Fingerprint of a source file under a given render configuration.
///
/// Any change to the source bytes or to an option that affects output
/// yields a different value.
pub fn fingerprint(source: &[u8], config: &RenderConfig) -> u64 {
    StableHasher::new()
        .update_usize(source.len())
        .update(source)
        .update_bool(config.strong == StrongStyle::Bold)
        .update_u64(config.font_size_pt.map_or(0, u64::from))
        .update_bool(config.draft)
        .update_str(config.problem_prefix())
        .update_str(config.default_title())
        .finish()
}

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key: path of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Arc<Path>);

impl CacheKey {
    /// Create a new cache key from a source path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    /// Get the source path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for CacheKey {
    fn from(path: PathBuf) -> Self {
        Self(Arc::from(path))
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

// =============================================================================
// Cache Entry
// =============================================================================

/// Last generated state of one document, with version tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    /// Fingerprint of the source that produced the artifact.
    pub fingerprint: u64,
    /// Number of times the artifact was regenerated.
    pub version: u64,
}

impl CacheEntry {
    /// Create a new cache entry with version 0.
    pub fn new(fingerprint: u64) -> Self {
        Self {
            fingerprint,
            version: 0,
        }
    }

    /// Record a regeneration.
    pub fn update(&mut self, fingerprint: u64) {
        self.fingerprint = fingerprint;
        self.version += 1;
    }
}

// =============================================================================
// Render Cache
// =============================================================================

/// Non-thread-safe render cache.
pub type RenderCache = FxHashMap<CacheKey, CacheEntry>;

/// Thread-safe shared render cache.
///
/// Uses `parking_lot::RwLock` for better performance under contention.
#[derive(Debug, Clone, Default)]
pub struct SharedRenderCache {
    inner: Arc<RwLock<RenderCache>>,
}

impl SharedRenderCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a closure with read access to the cache.
    pub fn with_read<R>(&self, f: impl FnOnce(&RenderCache) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Execute a closure with write access to the cache.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut RenderCache) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Get a copy of a cached entry.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.with_read(|c| c.get(key).copied())
    }

    /// Check whether `fingerprint` matches what was last generated.
    pub fn is_fresh(&self, key: &CacheKey, fingerprint: u64) -> bool {
        self.get(key).is_some_and(|e| e.fingerprint == fingerprint)
    }

    /// Record a successful generation, bumping the version of an existing entry.
    pub fn record(&self, key: CacheKey, fingerprint: u64) -> CacheEntry {
        self.with_write(|c| {
            let entry = c
                .entry(key)
                .and_modify(|e| e.update(fingerprint))
                .or_insert_with(|| CacheEntry::new(fingerprint));
            *entry
        })
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.with_write(|c| c.remove(key))
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.with_read(|c| c.len())
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
