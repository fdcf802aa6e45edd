//! Durable time-series cache.
//!
//! One JSON file per cache key under a cache directory. There is no TTL:
//! keys embed the requested date range, so a new range simply misses and a
//! refetch of the same range overwrites the entry wholesale. Concurrent
//! fetches for the same key may both miss and both write; the writes carry
//! equivalent data for the same request, so last-write-wins is accepted.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use terrasense_core::CacheEntry;

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// Key/value store for fetched series.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    dir: PathBuf,
}

impl SeriesStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store's root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path backing a cache key.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Looks up a cached series.
    ///
    /// A read before any write for the key returns `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only for a present-but-unreadable entry.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<CacheEntry<T>>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(key, "Cache miss");
            return Ok(None);
        }

        let entry: CacheEntry<T> = load_json(&path).await?;
        debug!(key, points = entry.series.len(), "Cache hit");
        Ok(Some(entry))
    }

    /// Stores a series under a key, replacing any existing entry wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on serialization or filesystem failure.
    #[instrument(skip(self, series))]
    pub async fn put<T: Serialize>(&self, key: &str, series: Vec<T>) -> Result<(), StoreError> {
        let entry = CacheEntry::new(key, series);
        let path = self.path_for(key);
        save_json(&path, &entry).await?;
        debug!(key, points = entry.series.len(), "Cache entry written");
        Ok(())
    }

    /// Returns true if an entry exists for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Removes every entry in the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on filesystem failure.
    pub async fn clear(&self) -> Result<(), StoreError> {
        if self.dir.exists() {
            tokio::fs::remove_dir_all(&self.dir).await?;
        }
        Ok(())
    }
}

/// Maps a cache key onto a safe file name.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
