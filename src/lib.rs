//! Quill library crate (used by the `quill` binary and integration tests).
//!
//! Turns a discussion topic into a short, specific comment that names a required product
//! marker. The pipeline is resilient end to end: remote failures degrade to a deterministic
//! fallback instead of surfacing to the caller.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`CommentService`] - Context assembly plus the quality gate
//! - [`CommentController`], [`Comment`] - Bounded generate/validate loop
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//!
//! ## Embedding & Retrieval
//! - [`EmbeddingClient`], [`HttpEmbeddingBackend`] - Cached, batched embeddings
//! - [`EmbeddingCacheHandle`] - Shared content-addressed vector cache
//! - [`RetrievalService`], [`Corpus`] - Cosine top-k over a corpus
//!
//! ## Generation
//! - [`GenerationClient`], [`GenaiBackend`] - Ordered model chain with retry
//! - [`PromptBuilder`], [`Topic`], [`PromptContext`] - Prompt assembly
//!
//! ## Resilience
//! - [`RetryPolicy`], [`RemoteError`], [`ErrorClass`] - Classified, bounded retry
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod generation;
pub mod hashing;
pub mod pipeline;
pub mod quality;
pub mod remote;
pub mod retrieval;
pub mod retry;

pub use cache::{CacheStats, EmbeddingCache, EmbeddingCacheHandle};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{
    EmbeddingBackend, EmbeddingClient, EmbeddingError, EmbeddingSettings, HttpEmbeddingBackend,
};
pub use generation::{
    GenaiBackend, GenerationBackend, GenerationClient, GenerationError, GenerationOutput,
    GenerationParams, Intent, ModelFailure, Prompt, PromptBuilder, PromptContext, Topic,
    detect_intent,
};
pub use hashing::{Fingerprint, fingerprint};
pub use pipeline::{CommentService, ContextRetriever, CorpusRetriever, NoRetrieval};
pub use quality::{
    Comment, CommentController, CommentOrigin, FallbackReason, QualityRules, RuleCategory,
    RuleViolation, ValidationVerdict, synthesize_fallback,
};
pub use remote::{Classify, ErrorClass, RemoteError};
pub use retrieval::{
    Corpus, CorpusEntry, CorpusProvider, InMemoryCorpusProvider, RetrievalError,
    RetrievalResult, RetrievalService, cosine_similarity,
};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingBackend;
#[cfg(any(test, feature = "mock"))]
pub use generation::{MockCall, MockGenerationBackend};
#[cfg(any(test, feature = "mock"))]
pub use retry::RecordingSleeper;
