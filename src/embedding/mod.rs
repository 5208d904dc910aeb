//! Batched, cached text embedding against a remote service.
//!
//! - [`EmbeddingBackend`]: one remote request (HTTP in production, [`MockEmbeddingBackend`]
//!   in tests)
//! - [`EmbeddingClient`]: truncation, fingerprinting, cache-first sub-batching, retry and
//!   per-call timeout

pub mod backend;
pub mod client;
pub mod error;
pub mod http;
pub mod text;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use backend::EmbeddingBackend;
pub use client::{EmbeddingClient, EmbeddingSettings};
pub use error::EmbeddingError;
pub use http::HttpEmbeddingBackend;
pub use text::{l2_normalize, prepare_text, truncate_at_word_boundary};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingBackend;
