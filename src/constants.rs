//! Cross-cutting, shared constants.
//!
//! Config defaults live here so the embedding client, generation client, quality gate and
//! [`crate::config::Config`] agree on them without importing each other.
//!
//! # Dimension Invariants
//!
//! A corpus is built under exactly one embedding model, so every vector in it shares one
//! length. Use [`validate_embedding_dim`] at the retrieval boundary to turn a disagreement
//! into a hard error instead of a silently wrong similarity score.

use std::time::Duration;

/// Maximum characters submitted per text to the embedding service.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 1500;

/// Default number of texts per embedding sub-batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Hard ceiling imposed by the remote embedding service.
pub const MAX_BATCH_SIZE: usize = 100;

/// Per-call timeout applied to every remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after the first attempt, per model or per sub-batch.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay; doubled on every further retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Upper bound for a single backoff delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1/embeddings";

pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_FALLBACK_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro"];

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 300;

pub const DEFAULT_MIN_CHARS: usize = 200;
pub const DEFAULT_MAX_CHARS: usize = 800;
pub const DEFAULT_MIN_SENTENCES: usize = 2;
pub const DEFAULT_MAX_SENTENCES: usize = 5;
pub const DEFAULT_MIN_TOPIC_OVERLAP: usize = 2;
pub const DEFAULT_REQUIRED_MARKER: &str = "KiloCode";

/// Boilerplate that marks a comment as generic.
pub const DEFAULT_FORBIDDEN_PHRASES: &[&str] = &[
    "interesting discussion",
    "thanks for sharing",
    "great post",
    "nice thread",
    "good topic",
    "appreciate this",
    "thanks for starting",
    "many developers encounter",
    "analyze systematically",
    "time-consuming manual inspection",
];

/// Results taken from each corpus when assembling prompt context.
pub const DEFAULT_TOP_K: usize = 3;

/// Reference context is capped at this many characters inside a prompt.
pub const MAX_CONTEXT_CHARS: usize = 800;

/// Style examples are capped at this many characters inside a prompt.
pub const MAX_STYLE_CHARS: usize = 400;

/// Error returned when two embedding dimensions disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use quill::constants::validate_embedding_dim;
///
/// assert!(validate_embedding_dim(1536, 1536).is_ok());
/// assert!(validate_embedding_dim(768, 1536).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
