use std::sync::Arc;

use crate::hashing::Fingerprint;

/// Cache key: the same text embedded under two models yields two entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub fingerprint: Fingerprint,
    pub model_id: Arc<str>,
}

impl CacheKey {
    pub fn new(fingerprint: Fingerprint, model_id: &str) -> Self {
        Self {
            fingerprint,
            model_id: Arc::from(model_id),
        }
    }
}

/// A stored embedding. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub vector: Arc<[f32]>,
    pub model_id: Arc<str>,
}

impl CacheEntry {
    #[inline]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: u64,
    /// Model of the most recent store, `None` until the first store.
    pub model_id: Option<String>,
}
