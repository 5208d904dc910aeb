//! OpenAI-compatible `/v1/embeddings` backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::backend::EmbeddingBackend;
use crate::remote::RemoteError;

/// Embedding backend speaking the OpenAI embeddings wire format over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingBackend {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpEmbeddingBackend {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EmbeddingBackend for HttpEmbeddingBackend {
    async fn embed_batch(
        &self,
        model: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, RemoteError> {
        let body = EmbeddingsRequest {
            model,
            input: texts,
        };

        let mut request = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                RemoteError::Timeout {
                    after: self.timeout,
                }
            } else {
                RemoteError::from(err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(
                status.as_u16(),
                model,
                &provider_message(&text),
            ));
        }

        let parsed: EmbeddingsResponse =
            response
                .json()
                .await
                .map_err(|e| RemoteError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        debug!(
            model,
            inputs = texts.len(),
            outputs = parsed.data.len(),
            "Embedding response received"
        );

        into_ordered_vectors(parsed, texts.len())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pulls `error.message` out of an OpenAI-style error body, or returns the body as-is.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn into_ordered_vectors(
    response: EmbeddingsResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, RemoteError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(RemoteError::MalformedResponse {
            reason: format!("expected {expected} embeddings, got {}", data.len()),
        });
    }

    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(pos, d)| d.index != pos) {
        return Err(RemoteError::MalformedResponse {
            reason: "embedding indices are not a permutation of the inputs".to_string(),
        });
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}
