use std::future::Future;
use tracing::{debug, warn};

use crate::embedding::EmbeddingBackend;
use crate::generation::PromptContext;
use crate::retrieval::{CorpusProvider, RetrievalService};
use crate::retry::Sleeper;

/// Corpus searched for reference snippets.
pub const DOCS_CORPUS: &str = "docs";
/// Corpus searched for example comments.
pub const COMMENTS_CORPUS: &str = "comments";

/// Source of retrieved prompt context. Failures are absorbed; an empty context is valid.
pub trait ContextRetriever: Send + Sync {
    fn retrieve(&self, query: &str, top_k: usize) -> impl Future<Output = PromptContext> + Send;
}

/// `None` retrieves nothing.
impl<R: ContextRetriever> ContextRetriever for Option<R> {
    async fn retrieve(&self, query: &str, top_k: usize) -> PromptContext {
        match self {
            Some(inner) => inner.retrieve(query, top_k).await,
            None => PromptContext::default(),
        }
    }
}

/// Retriever for deployments without corpora.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetrieval;

impl ContextRetriever for NoRetrieval {
    async fn retrieve(&self, _query: &str, _top_k: usize) -> PromptContext {
        PromptContext::default()
    }
}

/// Searches the `docs` corpus for snippets and the `comments` corpus for style examples.
pub struct CorpusRetriever<B, S, P> {
    service: RetrievalService<B, S>,
    provider: P,
}

impl<B: EmbeddingBackend, S: Sleeper, P: CorpusProvider> CorpusRetriever<B, S, P> {
    /// Searches the corpora `provider` holds under [`DOCS_CORPUS`] and [`COMMENTS_CORPUS`].
    pub fn new(service: RetrievalService<B, S>, provider: P) -> Self {
        Self { service, provider }
    }

    pub fn service(&self) -> &RetrievalService<B, S> {
        &self.service
    }

    async fn texts_from(&self, corpus: &str, query: &str, top_k: usize) -> Vec<String> {
        match self
            .service
            .search_named(query, &self.provider, corpus, top_k)
            .await
        {
            Ok(results) => {
                debug!(corpus, hits = results.len(), "Context retrieved");
                results.into_iter().map(|r| r.text).collect()
            }
            Err(error) => {
                warn!(corpus, error = %error, "Retrieval failed, continuing without corpus");
                Vec::new()
            }
        }
    }
}

impl<B: EmbeddingBackend, S: Sleeper, P: CorpusProvider> ContextRetriever
    for CorpusRetriever<B, S, P>
{
    async fn retrieve(&self, query: &str, top_k: usize) -> PromptContext {
        PromptContext {
            snippets: self.texts_from(DOCS_CORPUS, query, top_k).await,
            style_examples: self.texts_from(COMMENTS_CORPUS, query, top_k).await,
        }
    }
}

impl<B, S, P> std::fmt::Debug for CorpusRetriever<B, S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusRetriever")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}
