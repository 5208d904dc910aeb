//! Generation backend over the `genai` multi-provider client.
//!
//! The provider is picked by `genai` from the model name (`gemini-*` goes to Gemini, `gpt-*`
//! to OpenAI, ...); credentials come from the provider's usual environment variable.

use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::{Client, webc};
use tracing::debug;

use super::backend::{GenerationBackend, GenerationParams};
use super::prompt::Prompt;
use crate::remote::RemoteError;

/// [`GenerationBackend`] backed by a shared `genai` client.
#[derive(Clone, Default)]
pub struct GenaiBackend {
    client: Client,
}

impl GenaiBackend {
    /// Wraps a configured client (custom resolvers, adapter mapping, ...).
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for GenaiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiBackend").finish_non_exhaustive()
    }
}

impl GenerationBackend for GenaiBackend {
    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<String, RemoteError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.user.clone()),
        ]);
        let options = ChatOptions::default()
            .with_temperature(params.temperature)
            .with_top_p(params.top_p)
            .with_max_tokens(params.max_output_tokens);

        let response = self
            .client
            .exec_chat(model, request, Some(&options))
            .await
            .map_err(|e| remote_error(e, model))?;

        let text = response.first_text().unwrap_or_default().trim().to_string();
        debug!(model, chars = text.chars().count(), "Generation response received");

        if text.is_empty() {
            return Err(RemoteError::MalformedResponse {
                reason: "model returned no text".to_string(),
            });
        }
        Ok(text)
    }
}

/// Maps a `genai` failure to a [`RemoteError`] from its variant. Message text is only
/// inspected for variants that carry nothing more specific.
pub(crate) fn remote_error(err: genai::Error, model: &str) -> RemoteError {
    use genai::Error as E;

    match err {
        E::WebModelCall { webc_error, .. } | E::WebAdapterCall { webc_error, .. } => {
            web_call_error(webc_error, model)
        }
        E::RequiresApiKey { .. } | E::NoAuthResolver { .. } | E::NoAuthData { .. } | E::Resolver { .. } => {
            RemoteError::Unauthorized {
                reason: err.to_string(),
            }
        }
        E::ChatReqHasNoMessages { .. }
        | E::LastChatMessageIsNotUser { .. }
        | E::MessageRoleNotSupported { .. }
        | E::MessageContentTypeNotSupported { .. }
        | E::AdapterNotSupported { .. }
        | E::ModelMapperFailed { .. } => RemoteError::InvalidRequest {
            reason: err.to_string(),
        },
        E::NoChatResponse { .. }
        | E::InvalidJsonResponseElement { .. }
        | E::StreamParse { .. }
        | E::SerdeJson(_) => RemoteError::MalformedResponse {
            reason: err.to_string(),
        },
        other => RemoteError::from_message(&other.to_string(), model),
    }
}

fn web_call_error(err: webc::Error, model: &str) -> RemoteError {
    match err {
        webc::Error::ResponseFailedStatus { status, body, .. } => {
            RemoteError::from_status(status.as_u16(), model, &body)
        }
        webc::Error::Reqwest(e) => RemoteError::from(e),
        webc::Error::ResponseFailedNotJson { content_type } => RemoteError::MalformedResponse {
            reason: format!("non-JSON response ({content_type})"),
        },
        other => RemoteError::from_message(&other.to_string(), model),
    }
}
