//! Process-local embedding cache.
//!
//! The cache is the only shared mutable state in the crate. It is constructed explicitly
//! and handed to the [`crate::embedding::EmbeddingClient`] as an [`EmbeddingCacheHandle`].

pub mod embedding;
pub mod types;


pub use embedding::{EmbeddingCache, EmbeddingCacheHandle};
pub use types::{CacheEntry, CacheKey, CacheStats};
