//! Comment generation against a chain of remote models.
//!
//! - [`GenerationBackend`]: one request to one model ([`GenaiBackend`] in production)
//! - [`GenerationClient`]: walks the model chain with classification-driven retry
//! - [`PromptBuilder`]: system/user prompts, key points and corrective instructions
//! - [`detect_intent`]: what the post asks for, which shapes the task line
//! - [`context_pack`]: built-in reference snippets

pub mod backend;
pub mod client;
pub mod context_pack;
pub mod error;
pub mod genai_backend;
pub mod intent;
pub mod prompt;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use backend::{GenerationBackend, GenerationParams};
pub use client::{GenerationClient, GenerationOutput};
pub use context_pack::{context_pack, select_snippets};
pub use error::{GenerationError, ModelFailure};
pub use genai_backend::GenaiBackend;
pub use intent::{Intent, detect_intent};
pub use prompt::{Prompt, PromptBuilder, PromptContext, Topic, extract_key_points};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockGenerationBackend};
