use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Query and corpus vectors disagree in length; the corpus was built under another model.
    #[error("dimension mismatch in corpus '{corpus}': query has {query}, corpus has {corpus_dim}")]
    DimensionMismatch {
        corpus: String,
        query: usize,
        corpus_dim: usize,
    },

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("corpus '{corpus}' is inconsistent: {reason}")]
    InconsistentCorpus { corpus: String, reason: String },

    #[error("corpus not found: {name}")]
    CorpusNotFound { name: String },

    #[error("failed to load corpus '{corpus}': {reason}")]
    CorpusLoad { corpus: String, reason: String },
}
