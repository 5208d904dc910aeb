//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `QUILL_*` environment variables. The result is
//! read once at start-up and never mutated afterwards.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL, DEFAULT_FALLBACK_MODELS,
    DEFAULT_GENERATION_MODEL, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MAX_RETRIES, DEFAULT_MAX_TEXT_CHARS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
    DEFAULT_TOP_K, DEFAULT_TOP_P, MAX_BATCH_SIZE,
};
use crate::embedding::EmbeddingSettings;
use crate::generation::GenerationParams;
use crate::quality::{QualityRules, synthesize_fallback};
use crate::retry::RetryPolicy;

/// Topic used to prove at start-up that the fallback satisfies the rules. It is also
/// checked empty and with every forbidden phrase appended.
const SAMPLE_TOPIC: &str = "Build pipeline keeps failing after dependency upgrade\n\n\
    Since upgrading the compiler toolchain the release build fails with linker errors.";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// OpenAI-compatible embeddings endpoint.
    pub embedding_url: String,

    /// Bearer token for the embeddings endpoint.
    pub embedding_api_key: Option<String>,

    pub embedding_model: String,

    /// First model of the generation chain.
    pub generation_model: String,

    /// Models tried, in order, after `generation_model`.
    pub fallback_models: Vec<String>,

    /// Texts per embedding sub-batch. Default: `20`, at most `100`.
    pub batch_size: usize,

    /// Characters kept per embedded text. Default: `1500`.
    pub max_text_chars: usize,

    /// Per-call timeout for remote requests. Default: `30s`.
    pub timeout: Duration,

    /// Retries after the first attempt for transient failures. Default: `3`.
    pub max_retries: u32,

    pub initial_backoff: Duration,

    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,

    pub quality: QualityRules,

    /// Results taken from each corpus. Default: `3`.
    pub top_k: usize,

    /// Directory holding `docs.json` / `comments.json` corpora. Retrieval is off when unset.
    pub corpus_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            fallback_models: DEFAULT_FALLBACK_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            quality: QualityRules::default(),
            top_k: DEFAULT_TOP_K,
            corpus_dir: None,
        }
    }
}

impl Config {
    const ENV_EMBEDDING_URL: &'static str = "QUILL_EMBEDDING_URL";
    const ENV_EMBEDDING_API_KEY: &'static str = "QUILL_EMBEDDING_API_KEY";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_EMBEDDING_MODEL: &'static str = "QUILL_EMBEDDING_MODEL";
    const ENV_GENERATION_MODEL: &'static str = "QUILL_GENERATION_MODEL";
    const ENV_FALLBACK_MODELS: &'static str = "QUILL_FALLBACK_MODELS";
    const ENV_BATCH_SIZE: &'static str = "QUILL_BATCH_SIZE";
    const ENV_MAX_TEXT_CHARS: &'static str = "QUILL_MAX_TEXT_CHARS";
    const ENV_TIMEOUT_SECS: &'static str = "QUILL_TIMEOUT_SECS";
    const ENV_MAX_RETRIES: &'static str = "QUILL_MAX_RETRIES";
    const ENV_INITIAL_BACKOFF_MS: &'static str = "QUILL_INITIAL_BACKOFF_MS";
    const ENV_TEMPERATURE: &'static str = "QUILL_TEMPERATURE";
    const ENV_TOP_P: &'static str = "QUILL_TOP_P";
    const ENV_MAX_OUTPUT_TOKENS: &'static str = "QUILL_MAX_OUTPUT_TOKENS";
    const ENV_MIN_CHARS: &'static str = "QUILL_MIN_CHARS";
    const ENV_MAX_CHARS: &'static str = "QUILL_MAX_CHARS";
    const ENV_MIN_SENTENCES: &'static str = "QUILL_MIN_SENTENCES";
    const ENV_MAX_SENTENCES: &'static str = "QUILL_MAX_SENTENCES";
    const ENV_REQUIRED_MARKER: &'static str = "QUILL_REQUIRED_MARKER";
    const ENV_FORBIDDEN_PHRASES: &'static str = "QUILL_FORBIDDEN_PHRASES";
    const ENV_MIN_TOPIC_OVERLAP: &'static str = "QUILL_MIN_TOPIC_OVERLAP";
    const ENV_TOP_K: &'static str = "QUILL_TOP_K";
    const ENV_CORPUS_DIR: &'static str = "QUILL_CORPUS_DIR";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let rules = defaults.quality.clone();

        let embedding_api_key = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY));

        let quality = QualityRules {
            min_chars: Self::parse_from_env(Self::ENV_MIN_CHARS, rules.min_chars)?,
            max_chars: Self::parse_from_env(Self::ENV_MAX_CHARS, rules.max_chars)?,
            min_sentences: Self::parse_from_env(Self::ENV_MIN_SENTENCES, rules.min_sentences)?,
            max_sentences: Self::parse_from_env(Self::ENV_MAX_SENTENCES, rules.max_sentences)?,
            required_marker: Self::parse_string_from_env(
                Self::ENV_REQUIRED_MARKER,
                rules.required_marker,
            ),
            forbidden_phrases: Self::parse_list_from_env(
                Self::ENV_FORBIDDEN_PHRASES,
                rules.forbidden_phrases,
            ),
            min_topic_overlap: Self::parse_from_env(
                Self::ENV_MIN_TOPIC_OVERLAP,
                rules.min_topic_overlap,
            )?,
        }
        .normalized();

        Ok(Self {
            embedding_url: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_URL,
                defaults.embedding_url,
            ),
            embedding_api_key,
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            generation_model: Self::parse_string_from_env(
                Self::ENV_GENERATION_MODEL,
                defaults.generation_model,
            ),
            fallback_models: Self::parse_list_from_env(
                Self::ENV_FALLBACK_MODELS,
                defaults.fallback_models,
            ),
            batch_size: Self::parse_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?,
            max_text_chars: Self::parse_from_env(Self::ENV_MAX_TEXT_CHARS, defaults.max_text_chars)?,
            timeout: Duration::from_secs(Self::parse_from_env(
                Self::ENV_TIMEOUT_SECS,
                defaults.timeout.as_secs(),
            )?),
            max_retries: Self::parse_from_env(Self::ENV_MAX_RETRIES, defaults.max_retries)?,
            initial_backoff: Duration::from_millis(Self::parse_from_env(
                Self::ENV_INITIAL_BACKOFF_MS,
                defaults.initial_backoff.as_millis() as u64,
            )?),
            temperature: Self::parse_from_env(Self::ENV_TEMPERATURE, defaults.temperature)?,
            top_p: Self::parse_from_env(Self::ENV_TOP_P, defaults.top_p)?,
            max_output_tokens: Self::parse_from_env(
                Self::ENV_MAX_OUTPUT_TOKENS,
                defaults.max_output_tokens,
            )?,
            quality,
            top_k: Self::parse_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            corpus_dir: Self::parse_optional_string_from_env(Self::ENV_CORPUS_DIR)
                .map(PathBuf::from),
        })
    }

    /// Checks cross-field invariants (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                value: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        if self.max_text_chars == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_TEXT_CHARS,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_TIMEOUT_SECS,
            });
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_OUTPUT_TOKENS,
            });
        }
        if self.generation_model.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_GENERATION_MODEL,
            });
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_EMBEDDING_MODEL,
            });
        }

        Self::check_unit_range(Self::ENV_TEMPERATURE, self.temperature, 2.0)?;
        Self::check_unit_range(Self::ENV_TOP_P, self.top_p, 1.0)?;

        self.validate_quality()?;

        if let Some(ref dir) = self.corpus_dir {
            if !dir.exists() {
                return Err(ConfigError::PathNotFound { path: dir.clone() });
            }
            if !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        Ok(())
    }

    fn validate_quality(&self) -> Result<(), ConfigError> {
        let rules = &self.quality;

        if rules.min_chars > rules.max_chars {
            return Err(ConfigError::InvertedRange {
                name: "chars",
                min: rules.min_chars,
                max: rules.max_chars,
            });
        }
        if rules.min_sentences > rules.max_sentences {
            return Err(ConfigError::InvertedRange {
                name: "sentences",
                min: rules.min_sentences,
                max: rules.max_sentences,
            });
        }
        if rules.max_sentences == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_SENTENCES,
            });
        }
        if rules.required_marker.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_REQUIRED_MARKER,
            });
        }
        if rules.required_marker.contains(['.', '!', '?']) {
            return Err(ConfigError::MarkerHasTerminator {
                marker: rules.required_marker.clone(),
            });
        }

        let hostile_topic = format!("{SAMPLE_TOPIC} {}", rules.forbidden_phrases.join(" "));
        for topic in [SAMPLE_TOPIC, "", hostile_topic.as_str()] {
            let fallback = synthesize_fallback(topic, rules);
            let verdict = rules.validate(&fallback, topic);
            if !verdict.accepted {
                return Err(ConfigError::UnsatisfiableRules {
                    violations: verdict
                        .violations
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }

        Ok(())
    }

    fn check_unit_range(name: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
        if !(0.0..=max).contains(&value) {
            return Err(ConfigError::OutOfRange {
                name,
                value,
                min: 0.0,
                max,
            });
        }
        Ok(())
    }

    /// Primary generation model followed by the fallbacks, without duplicates.
    pub fn model_chain(&self) -> Vec<String> {
        let mut chain: Vec<String> = Vec::with_capacity(1 + self.fallback_models.len());
        for model in std::iter::once(&self.generation_model).chain(&self.fallback_models) {
            let model = model.trim();
            if !model.is_empty() && !chain.iter().any(|m| m == model) {
                chain.push(model.to_string());
            }
        }
        chain
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.initial_backoff)
    }

    pub fn embedding_settings(&self) -> EmbeddingSettings {
        EmbeddingSettings {
            model_id: self.embedding_model.clone(),
            max_text_chars: self.max_text_chars,
            batch_size: self.batch_size,
            timeout: self.timeout,
            retry: self.retry_policy(),
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_output_tokens: self.max_output_tokens,
        }
    }

    fn parse_from_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse()
                    .map_err(|e: T::Err| ConfigError::InvalidValue {
                        name,
                        reason: e.to_string(),
                        value,
                    })
            }
            _ => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    /// Comma-separated list; empty items dropped. An unset or blank variable keeps `default`.
    fn parse_list_from_env(var_name: &str, default: Vec<String>) -> Vec<String> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            None => default,
        }
    }
}
