use std::fmt;
use thiserror::Error;

use crate::remote::{ErrorClass, RemoteError};

/// Final failure of one model in the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFailure {
    pub model: String,
    pub class: ErrorClass,
    pub attempts: u32,
    pub error: RemoteError,
}

impl fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} after {} attempt(s): {})",
            self.model, self.class, self.attempts, self.error
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("model chain is empty")]
    EmptyChain,

    /// Every model was tried; one entry per model, in chain order.
    #[error("all models failed: {}", summarize(.failures))]
    Exhausted { failures: Vec<ModelFailure> },
}

impl GenerationError {
    pub fn failures(&self) -> &[ModelFailure] {
        match self {
            GenerationError::EmptyChain => &[],
            GenerationError::Exhausted { failures } => failures,
        }
    }
}

fn summarize(failures: &[ModelFailure]) -> String {
    failures
        .iter()
        .map(ModelFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
