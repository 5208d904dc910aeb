use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::backend::EmbeddingBackend;
use crate::remote::RemoteError;

/// In-process embedding backend with deterministic vectors and scripted failures.
///
/// Each text maps to a pseudo-random vector seeded by its blake3 hash unless a fixed vector
/// was registered with [`MockEmbeddingBackend::set_vector`]. Clones share state.
#[derive(Debug, Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    state: Arc<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<String>>>,
    failures: Mutex<VecDeque<RemoteError>>,
    always_fail: Mutex<Option<RemoteError>>,
    fixed: Mutex<HashMap<String, Vec<f32>>>,
}

impl MockEmbeddingBackend {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            state: Arc::new(MockState::default()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Queues an error for the next call. Queued errors are consumed in order.
    pub fn fail_next(&self, error: RemoteError) {
        self.state.failures.lock().push_back(error);
    }

    /// Makes every call fail with `error` until cleared.
    pub fn fail_always(&self, error: RemoteError) {
        *self.state.always_fail.lock() = Some(error);
    }

    pub fn clear_failures(&self) {
        self.state.failures.lock().clear();
        *self.state.always_fail.lock() = None;
    }

    /// Returns `vector` for `text` instead of the seeded one.
    pub fn set_vector(&self, text: &str, vector: Vec<f32>) {
        self.state.fixed.lock().insert(text.to_string(), vector);
    }

    /// Number of `embed_batch` calls, failed ones included.
    pub fn call_count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Texts submitted by each call, in call order.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.state.requests.lock().clone()
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.state.fixed.lock().get(text) {
            return v.clone();
        }
        seeded_vector(text, self.dimension)
    }
}

impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_batch(
        &self,
        _model: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, RemoteError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.requests.lock().push(texts.to_vec());

        if let Some(error) = self.state.failures.lock().pop_front() {
            return Err(error);
        }
        if let Some(error) = self.state.always_fail.lock().clone() {
            return Err(error);
        }

        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

fn seeded_vector(text: &str, dimension: usize) -> Vec<f32> {
    let hash = blake3::hash(text.as_bytes());
    let mut seed = u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap_or([0; 8])) | 1;

    (0..dimension)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            ((seed >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
        })
        .collect()
}
