use thiserror::Error;

use crate::remote::{Classify, ErrorClass, RemoteError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmbeddingError {
    #[error("invalid batch size {size}: must be between 1 and {max}")]
    InvalidBatchSize { size: usize, max: usize },

    #[error("embedding sub-batch {batch} failed after {attempts} attempt(s): {source}")]
    Remote {
        batch: usize,
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    #[error("embedding dimension changed within one call: expected {expected}, got {actual}")]
    InconsistentDimension { expected: usize, actual: usize },
}

impl Classify for EmbeddingError {
    fn class(&self) -> ErrorClass {
        match self {
            EmbeddingError::Remote { source, .. } => source.class(),
            EmbeddingError::InvalidBatchSize { .. }
            | EmbeddingError::InconsistentDimension { .. } => ErrorClass::Config,
        }
    }
}
