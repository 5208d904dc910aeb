//! Cache-first batched embedding.
//!
//! `embed` fingerprints every prepared text, answers what it can from the shared cache, and
//! sends only the misses of each sub-batch to the backend. A sub-batch whose texts are all
//! cached costs no remote call. Vectors are cached raw; normalisation is applied to the
//! returned copies only.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::backend::EmbeddingBackend;
use super::error::EmbeddingError;
use super::text::{l2_normalize, prepare_text};
use crate::cache::EmbeddingCacheHandle;
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_TEXT_CHARS, DEFAULT_TIMEOUT,
    MAX_BATCH_SIZE,
};
use crate::hashing::Fingerprint;
use crate::remote::{Classify, RemoteError};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Settings for an [`EmbeddingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSettings {
    pub model_id: String,
    pub max_text_chars: usize,
    pub batch_size: usize,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Embeds texts through a backend, the shared cache and a retry policy.
pub struct EmbeddingClient<B, S = TokioSleeper> {
    backend: B,
    cache: EmbeddingCacheHandle,
    settings: EmbeddingSettings,
    sleeper: S,
}

impl<B: EmbeddingBackend> EmbeddingClient<B> {
    /// Creates a client that sleeps with tokio between retries.
    pub fn new(backend: B, cache: EmbeddingCacheHandle, settings: EmbeddingSettings) -> Self {
        Self::with_sleeper(backend, cache, settings, TokioSleeper)
    }
}

impl<B: EmbeddingBackend, S: Sleeper> EmbeddingClient<B, S> {
    /// Creates a client with an explicit [`Sleeper`].
    pub fn with_sleeper(
        backend: B,
        cache: EmbeddingCacheHandle,
        settings: EmbeddingSettings,
        sleeper: S,
    ) -> Self {
        Self {
            backend,
            cache,
            settings,
            sleeper,
        }
    }

    /// Model id used for requests and cache keys.
    #[inline]
    pub fn model_id(&self) -> &str {
        &self.settings.model_id
    }

    /// The shared cache this client reads and fills.
    #[inline]
    pub fn cache(&self) -> &EmbeddingCacheHandle {
        &self.cache
    }

    /// Settings fixed at construction.
    #[inline]
    pub fn settings(&self) -> &EmbeddingSettings {
        &self.settings
    }

    /// Embeds with the configured batch size and unit-length output.
    pub async fn embed_texts<T: AsRef<str>>(
        &self,
        texts: &[T],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.embed(texts, self.settings.batch_size, true).await
    }

    /// Embeds a single text.
    pub async fn embed_one(&self, text: &str, normalize: bool) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed(std::slice::from_ref(&text), 1, normalize).await?;
        vectors.pop().ok_or_else(|| EmbeddingError::Remote {
            batch: 0,
            attempts: 1,
            source: RemoteError::MalformedResponse {
                reason: "no vector returned for single input".to_string(),
            },
        })
    }

    /// Returns one vector per input, in input order.
    ///
    /// Any sub-batch that fails after its retry budget fails the whole call; vectors from
    /// sub-batches that already succeeded stay cached.
    pub async fn embed<T: AsRef<str>>(
        &self,
        texts: &[T],
        batch_size: usize,
        normalize: bool,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(EmbeddingError::InvalidBatchSize {
                size: batch_size,
                max: MAX_BATCH_SIZE,
            });
        }

        let model = self.settings.model_id.as_str();
        let prepared: Vec<String> = texts
            .iter()
            .map(|t| prepare_text(t.as_ref(), self.settings.max_text_chars))
            .collect();
        let fingerprints: Vec<Fingerprint> = prepared.iter().map(|t| Fingerprint::of(t)).collect();

        let mut resolved: Vec<Option<Arc<[f32]>>> = vec![None; prepared.len()];
        let mut hits = 0usize;
        let mut remote_calls = 0usize;

        for (batch, start) in (0..prepared.len()).step_by(batch_size).enumerate() {
            let end = (start + batch_size).min(prepared.len());

            // Distinct misses in this sub-batch, each with every position it fills.
            let mut misses: Vec<(Fingerprint, Vec<usize>)> = Vec::new();
            for idx in start..end {
                let fp = fingerprints[idx];
                if let Some(vector) = self.cache.lookup(&fp, model) {
                    resolved[idx] = Some(vector);
                    hits += 1;
                    continue;
                }
                match misses.iter_mut().find(|(seen, _)| *seen == fp) {
                    Some((_, positions)) => positions.push(idx),
                    None => misses.push((fp, vec![idx])),
                }
            }

            if misses.is_empty() {
                debug!(batch, size = end - start, "Sub-batch fully cached");
                continue;
            }

            let request: Vec<String> = misses
                .iter()
                .map(|(_, positions)| prepared[positions[0]].clone())
                .collect();
            let vectors = self.fetch(batch, &request).await?;
            remote_calls += 1;

            for ((fp, positions), vector) in misses.into_iter().zip(vectors) {
                let shared: Arc<[f32]> = Arc::from(vector);
                self.cache.store(fp, model, Arc::clone(&shared));
                for idx in positions {
                    resolved[idx] = Some(Arc::clone(&shared));
                }
            }
        }

        info!(
            model,
            texts = prepared.len(),
            cache_hits = hits,
            remote_calls,
            "Embedding complete"
        );

        finish(resolved, normalize)
    }

    async fn fetch(&self, batch: usize, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = self.settings.model_id.as_str();
        let timeout = self.settings.timeout;

        self.settings
            .retry
            .execute(&self.sleeper, "embedding", |attempt| async move {
                debug!(batch, attempt, texts = texts.len(), "Embedding sub-batch");
                let vectors =
                    match tokio::time::timeout(timeout, self.backend.embed_batch(model, texts))
                        .await
                    {
                        Ok(result) => result?,
                        Err(_) => return Err(RemoteError::Timeout { after: timeout }),
                    };
                check_batch(texts.len(), vectors)
            })
            .await
            .map_err(|exhausted| {
                warn!(
                    batch,
                    attempts = exhausted.attempts,
                    class = %exhausted.error.class(),
                    error = %exhausted.error,
                    "Embedding sub-batch failed"
                );
                EmbeddingError::Remote {
                    batch,
                    attempts: exhausted.attempts,
                    source: exhausted.error,
                }
            })
    }
}

impl<B, S> std::fmt::Debug for EmbeddingClient<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Rejects responses with the wrong count or mixed/zero dimensions.
fn check_batch(expected: usize, vectors: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>, RemoteError> {
    if vectors.len() != expected {
        return Err(RemoteError::MalformedResponse {
            reason: format!("expected {expected} vectors, got {}", vectors.len()),
        });
    }
    if let Some(first) = vectors.first() {
        let dim = first.len();
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            return Err(RemoteError::MalformedResponse {
                reason: "vectors in one response have differing or zero dimension".to_string(),
            });
        }
    }
    Ok(vectors)
}

fn finish(
    resolved: Vec<Option<Arc<[f32]>>>,
    normalize: bool,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut expected_dim: Option<usize> = None;
    let mut out = Vec::with_capacity(resolved.len());

    for (idx, slot) in resolved.into_iter().enumerate() {
        let vector = slot.ok_or_else(|| EmbeddingError::Remote {
            batch: idx,
            attempts: 0,
            source: RemoteError::MalformedResponse {
                reason: format!("no vector resolved for input {idx}"),
            },
        })?;

        match expected_dim {
            None => expected_dim = Some(vector.len()),
            Some(expected) if expected != vector.len() => {
                return Err(EmbeddingError::InconsistentDimension {
                    expected,
                    actual: vector.len(),
                });
            }
            Some(_) => {}
        }

        let mut owned = vector.to_vec();
        if normalize {
            l2_normalize(&mut owned);
        }
        out.push(owned);
    }

    Ok(out)
}
