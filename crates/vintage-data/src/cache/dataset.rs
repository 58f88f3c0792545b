//! Load-once, read-many holder for the fact table.

use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::loader::load_facts;

/// Memoised fact table with time-based expiry.
///
/// The cached frame is shared through an `Arc` and never mutated. An entry is
/// reloaded when it is older than the TTL or a different path is requested.
#[derive(Debug)]
pub struct DatasetCache {
    ttl: Option<Duration>,
    entry: Option<CachedDataset>,
    stats: CacheStats,
}

#[derive(Debug)]
struct CachedDataset {
    path: PathBuf,
    loaded_at: Instant,
    frame: Arc<DataFrame>,
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of loads from disk
    pub loads: usize,
    /// Number of requests served from memory
    pub hits: usize,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DatasetCache {
    /// Create a cache. `None` keeps the entry until it is invalidated.
    pub const fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entry: None,
            stats: CacheStats { loads: 0, hits: 0 },
        }
    }

    /// Cache entries that expire after `ttl`.
    pub const fn with_ttl(ttl: Duration) -> Self {
        Self::new(Some(ttl))
    }

    /// Return the cached table for `path`, loading it from disk if needed.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<DataFrame>> {
        self.get_or_load_with(path, |p| load_facts(p))
    }

    /// Like [`Self::get_or_load`] with a custom loader.
    pub fn get_or_load_with<F>(&mut self, path: impl AsRef<Path>, loader: F) -> Result<Arc<DataFrame>>
    where
        F: FnOnce(&Path) -> Result<DataFrame>,
    {
        let path = path.as_ref();

        if let Some(entry) = &self.entry {
            if entry.path == path && !self.is_expired(entry) {
                self.stats.hits += 1;
                return Ok(Arc::clone(&entry.frame));
            }
            log::debug!("dataset cache entry for {} is stale", entry.path.display());
        }

        let frame = Arc::new(loader(path)?);
        self.stats.loads += 1;
        self.entry = Some(CachedDataset {
            path: path.to_path_buf(),
            loaded_at: Instant::now(),
            frame: Arc::clone(&frame),
        });
        Ok(frame)
    }

    /// Drop the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// True when an unexpired entry is held.
    pub fn is_warm(&self) -> bool {
        self.entry.as_ref().is_some_and(|e| !self.is_expired(e))
    }

    /// Hit/miss counters.
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    fn is_expired(&self, entry: &CachedDataset) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.loaded_at.elapsed() >= ttl)
    }
}
