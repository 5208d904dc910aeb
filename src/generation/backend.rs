use std::future::Future;

use super::prompt::Prompt;
use crate::constants::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P};
use crate::remote::RemoteError;

/// Sampling knobs sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// A remote text-generation service. One call is one request against one model.
pub trait GenerationBackend: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;
}
