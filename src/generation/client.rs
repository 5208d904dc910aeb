//! Model-chain generation with per-model retry.
//!
//! Config-class failures advance to the next model at once. Transient failures are retried
//! against the same model under the retry policy, then the chain advances. The first
//! success ends the walk.

use std::time::Duration;
use tracing::{error, info, warn};

use super::backend::{GenerationBackend, GenerationParams};
use super::error::{GenerationError, ModelFailure};
use super::prompt::Prompt;
use crate::constants::DEFAULT_TIMEOUT;
use crate::remote::{Classify, ErrorClass, RemoteError};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Text produced by one model of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub text: String,
    pub model: String,
    /// Attempts spent on `model`, including the successful one.
    pub attempts: u32,
}

pub struct GenerationClient<B, S = TokioSleeper> {
    backend: B,
    params: GenerationParams,
    timeout: Duration,
    retry: RetryPolicy,
    sleeper: S,
}

impl<B: GenerationBackend> GenerationClient<B> {
    /// Creates a client that sleeps with tokio between retries.
    pub fn new(backend: B, params: GenerationParams, retry: RetryPolicy) -> Self {
        Self::with_sleeper(backend, params, retry, TokioSleeper)
    }
}

impl<B: GenerationBackend, S: Sleeper> GenerationClient<B, S> {
    /// Creates a client with an explicit [`Sleeper`], e.g. a recording one in tests.
    pub fn with_sleeper(backend: B, params: GenerationParams, retry: RetryPolicy, sleeper: S) -> Self {
        Self {
            backend,
            params,
            timeout: DEFAULT_TIMEOUT,
            retry,
            sleeper,
        }
    }

    /// Per-call timeout. Expiry counts as a transient failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default parameters used by [`Self::generate`].
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generates with the configured parameters.
    pub async fn generate(
        &self,
        prompt: &Prompt,
        chain: &[String],
    ) -> Result<GenerationOutput, GenerationError> {
        self.generate_with(prompt, chain, &self.params).await
    }

    /// Generates with per-call parameters.
    pub async fn generate_with(
        &self,
        prompt: &Prompt,
        chain: &[String],
        params: &GenerationParams,
    ) -> Result<GenerationOutput, GenerationError> {
        if chain.is_empty() {
            return Err(GenerationError::EmptyChain);
        }

        let mut failures = Vec::with_capacity(chain.len());

        for (position, model) in chain.iter().enumerate() {
            let model = model.as_str();
            let timeout = self.timeout;
            let result = self
                .retry
                .execute(&self.sleeper, model, |attempt| async move {
                    match tokio::time::timeout(timeout, self.backend.generate(model, prompt, params))
                        .await
                    {
                        Ok(result) => result.map(|text| (text, attempt)),
                        Err(_) => Err(RemoteError::Timeout { after: timeout }),
                    }
                })
                .await;

            match result {
                Ok((text, attempts)) => {
                    info!(
                        model,
                        position,
                        attempts,
                        prompt_chars = prompt.len(),
                        output_chars = text.chars().count(),
                        "Generation succeeded"
                    );
                    return Ok(GenerationOutput {
                        text,
                        model: model.to_string(),
                        attempts,
                    });
                }
                Err(exhausted) => {
                    let class = exhausted.error.class();
                    match class {
                        ErrorClass::Config => warn!(
                            model,
                            error = %exhausted.error,
                            "Config-class failure, advancing to next model"
                        ),
                        ErrorClass::Transient => warn!(
                            model,
                            attempts = exhausted.attempts,
                            error = %exhausted.error,
                            "Transient retries exhausted, advancing to next model"
                        ),
                    }
                    failures.push(ModelFailure {
                        model: model.to_string(),
                        class,
                        attempts: exhausted.attempts,
                        error: exhausted.error,
                    });
                }
            }
        }

        let err = GenerationError::Exhausted { failures };
        error!(error = %err, "Model chain exhausted");
        Err(err)
    }
}

impl<B, S> std::fmt::Debug for GenerationClient<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
