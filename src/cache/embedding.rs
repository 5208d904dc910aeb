//! Content-addressed embedding cache (in-memory).
//!
//! Keys are `(fingerprint, model_id)`. There is no capacity bound and no expiry: entries
//! leave only through [`EmbeddingCache::clear`] or process restart. Growth is bounded by the
//! number of distinct texts seen, which is small for this workload.

use moka::sync::Cache;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{CacheEntry, CacheKey, CacheStats};
use crate::hashing::Fingerprint;

/// Concurrent map from `(fingerprint, model)` to embedding vector.
pub struct EmbeddingCache {
    entries: Cache<CacheKey, Arc<CacheEntry>>,
    model_id: RwLock<Option<Arc<str>>>,
}

impl EmbeddingCache {
    /// Creates an empty, unbounded cache.
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
            model_id: RwLock::new(None),
        }
    }

    /// Returns the vector stored for `fingerprint` under `model_id`, if any.
    #[inline]
    pub fn lookup(&self, fingerprint: &Fingerprint, model_id: &str) -> Option<Arc<[f32]>> {
        let key = CacheKey::new(*fingerprint, model_id);
        self.entries.get(&key).map(|entry| Arc::clone(&entry.vector))
    }

    /// Stores a vector. The last writer for a key wins.
    pub fn store(&self, fingerprint: Fingerprint, model_id: &str, vector: impl Into<Arc<[f32]>>) {
        let model: Arc<str> = self.note_model(model_id);
        let entry = CacheEntry {
            fingerprint,
            vector: vector.into(),
            model_id: Arc::clone(&model),
        };

        debug!(
            fingerprint = fingerprint.short(),
            model = %model,
            dim = entry.dimension(),
            "Embedding cached"
        );

        self.entries.insert(
            CacheKey {
                fingerprint,
                model_id: model,
            },
            Arc::new(entry),
        );
    }

    fn note_model(&self, model_id: &str) -> Arc<str> {
        if let Some(current) = self.model_id.read().as_ref()
            && current.as_ref() == model_id
        {
            return Arc::clone(current);
        }

        let mut guard = self.model_id.write();
        if let Some(previous) = guard.as_ref()
            && previous.as_ref() != model_id
        {
            warn!(
                previous = %previous,
                current = model_id,
                "Embedding cache written under a different model id"
            );
        }
        let model: Arc<str> = Arc::from(model_id);
        *guard = Some(Arc::clone(&model));
        model
    }

    /// Returns `true` if an entry exists for the key.
    #[inline]
    pub fn contains(&self, fingerprint: &Fingerprint, model_id: &str) -> bool {
        self.entries
            .contains_key(&CacheKey::new(*fingerprint, model_id))
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        *self.model_id.write() = None;
    }

    /// Returns the entry count and the most recently used model id.
    pub fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            entry_count: self.entries.entry_count(),
            model_id: self.model_id.read().as_ref().map(|m| m.to_string()),
        }
    }

    /// Returns the number of cached vectors.
    #[inline]
    pub fn len(&self) -> u64 {
        self.stats().entry_count
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.entries.entry_count())
            .field("model_id", &*self.model_id.read())
            .finish()
    }
}

#[derive(Clone)]
/// Shared handle to an [`EmbeddingCache`].
///
/// Construct one at start-up and pass clones to every component that embeds text; tests
/// build their own isolated handles.
pub struct EmbeddingCacheHandle {
    inner: Arc<EmbeddingCache>,
}

impl EmbeddingCacheHandle {
    /// Creates a handle to a new, empty cache.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EmbeddingCache::new()),
        }
    }

    /// Returns the cached vector for `fingerprint` under `model_id`, if present.
    #[inline]
    pub fn lookup(&self, fingerprint: &Fingerprint, model_id: &str) -> Option<Arc<[f32]>> {
        self.inner.lookup(fingerprint, model_id)
    }

    /// Stores a vector in the shared cache. The last writer for a key wins.
    #[inline]
    pub fn store(&self, fingerprint: Fingerprint, model_id: &str, vector: impl Into<Arc<[f32]>>) {
        self.inner.store(fingerprint, model_id, vector)
    }

    /// Returns `true` if the shared cache holds the key.
    #[inline]
    pub fn contains(&self, fingerprint: &Fingerprint, model_id: &str) -> bool {
        self.inner.contains(fingerprint, model_id)
    }

    /// Empties the shared cache for every holder of this handle.
    #[inline]
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Returns the entry count and the most recently used model id.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    /// Returns the number of cached vectors.
    #[inline]
    pub fn len(&self) -> u64 {
        self.inner.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of strong references to the underlying cache.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Default for EmbeddingCacheHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EmbeddingCacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCacheHandle")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}
