//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Batch size is outside 1..=max.
    #[error("invalid batch size {value}: must be between 1 and {max}")]
    InvalidBatchSize { value: usize, max: usize },

    /// A setting that must be positive is zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// A required string setting is empty.
    #[error("{name} must not be empty")]
    EmptyValue { name: &'static str },

    /// The lower bound of a band exceeds its upper bound.
    #[error("invalid {name} range: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: usize,
        max: usize,
    },

    /// A float knob is outside its accepted range.
    #[error("{name}={value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The required marker would be split into several sentences.
    #[error("required marker '{marker}' must not contain sentence terminators")]
    MarkerHasTerminator { marker: String },

    /// The deterministic fallback cannot satisfy the configured rules.
    #[error("fallback comment violates the quality rules: {violations}")]
    UnsatisfiableRules { violations: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
