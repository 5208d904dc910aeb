use tracing::debug;

use super::corpus::{Corpus, CorpusProvider};
use super::error::RetrievalError;
use super::similarity::cosine_similarity;
use crate::constants::validate_embedding_dim;
use crate::embedding::{EmbeddingBackend, EmbeddingClient};
use crate::retry::Sleeper;

/// One scored corpus entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    pub text: String,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
    pub entry_id: String,
}

/// Linear-scan top-k search over a corpus, embedding the query through the shared client.
pub struct RetrievalService<B, S> {
    embedder: EmbeddingClient<B, S>,
}

impl<B: EmbeddingBackend, S: Sleeper> RetrievalService<B, S> {
    /// Ranks corpora by cosine similarity to queries embedded with `embedder`.
    pub fn new(embedder: EmbeddingClient<B, S>) -> Self {
        Self { embedder }
    }

    /// Client used to embed queries.
    pub fn embedder(&self) -> &EmbeddingClient<B, S> {
        &self.embedder
    }

    /// Returns at most `top_k` entries by descending similarity; ties keep corpus order.
    ///
    /// A `top_k` of zero or an empty corpus returns nothing without embedding the query.
    pub async fn search(
        &self,
        query: &str,
        corpus: &Corpus,
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        if top_k == 0 || corpus.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_one(query, true).await?;
        validate_embedding_dim(query_vector.len(), corpus.dimension()).map_err(|_| {
            RetrievalError::DimensionMismatch {
                corpus: corpus.name().to_string(),
                query: query_vector.len(),
                corpus_dim: corpus.dimension(),
            }
        })?;

        let mut scored: Vec<(usize, f32)> = corpus
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(&query_vector, &entry.vector)))
            .collect();

        // `sort_by` is stable, so equal scores stay in corpus order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        debug!(
            corpus = corpus.name(),
            candidates = corpus.len(),
            returned = scored.len(),
            best = scored.first().map(|(_, s)| *s),
            "Retrieval complete"
        );

        Ok(scored
            .into_iter()
            .map(|(idx, score)| {
                let entry = &corpus.entries()[idx];
                RetrievalResult {
                    text: entry.text.clone(),
                    score,
                    entry_id: entry.id.clone(),
                }
            })
            .collect())
    }

    /// Looks up `corpus` in `provider`, then searches it.
    pub async fn search_named<P: CorpusProvider + ?Sized>(
        &self,
        query: &str,
        provider: &P,
        corpus: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        let corpus = provider.corpus(corpus)?;
        self.search(query, &corpus, top_k).await
    }
}

impl<B, S> std::fmt::Debug for RetrievalService<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("embedder", &self.embedder)
            .finish()
    }
}
