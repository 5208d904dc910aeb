use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::backend::{GenerationBackend, GenerationParams};
use super::prompt::Prompt;
use crate::remote::RemoteError;

/// Scripted generation backend.
///
/// Each model has a queue of responses consumed in order and an optional standing response
/// used once the queue is empty. A model with neither fails with `ModelNotFound`. Clones
/// share state.
#[derive(Debug, Clone, Default)]
pub struct MockGenerationBackend {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    queued: HashMap<String, VecDeque<Result<String, RemoteError>>>,
    standing: HashMap<String, Result<String, RemoteError>>,
    calls: Vec<MockCall>,
}

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub model: String,
    pub prompt: Prompt,
    pub params: GenerationParams,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one successful response for `model`.
    pub fn respond(&self, model: &str, text: &str) -> &Self {
        self.push(model, Ok(text.to_string()))
    }

    /// Queues one failure for `model`.
    pub fn fail(&self, model: &str, error: RemoteError) -> &Self {
        self.push(model, Err(error))
    }

    /// Sets the response used for `model` whenever its queue is empty.
    pub fn always(&self, model: &str, result: Result<String, RemoteError>) -> &Self {
        self.state.lock().standing.insert(model.to_string(), result);
        self
    }

    fn push(&self, model: &str, result: Result<String, RemoteError>) -> &Self {
        self.state
            .lock()
            .queued
            .entry(model.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn calls_for(&self, model: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.model == model)
            .count()
    }

    /// Models in call order.
    pub fn models_called(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .map(|c| c.model.clone())
            .collect()
    }
}

impl GenerationBackend for MockGenerationBackend {
    async fn generate(
        &self,
        model: &str,
        prompt: &Prompt,
        params: &GenerationParams,
    ) -> Result<String, RemoteError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall {
            model: model.to_string(),
            prompt: prompt.clone(),
            params: *params,
        });

        if let Some(next) = state.queued.get_mut(model).and_then(VecDeque::pop_front) {
            return next;
        }
        state
            .standing
            .get(model)
            .cloned()
            .unwrap_or_else(|| {
                Err(RemoteError::ModelNotFound {
                    model: model.to_string(),
                })
            })
    }
}
