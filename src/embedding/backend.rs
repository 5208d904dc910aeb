use std::future::Future;

use crate::remote::RemoteError;

/// A remote service that turns texts into vectors.
///
/// One call is one network request. Implementations return exactly one vector per input,
/// in input order, and map every failure to a [`RemoteError`]. Retries, timeouts, batching
/// and caching are the caller's job.
pub trait EmbeddingBackend: Send + Sync {
    fn embed_batch(
        &self,
        model: &str,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, RemoteError>> + Send;
}
