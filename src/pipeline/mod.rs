//! Caller-facing comment production.
//!
//! [`CommentService::produce_comment`] assembles context (caller-supplied, retrieved, or the
//! built-in context pack) and runs the quality gate. It always returns text.

pub mod retriever;

#[cfg(test)]
mod tests;

pub use retriever::{
    COMMENTS_CORPUS, ContextRetriever, CorpusRetriever, DOCS_CORPUS, NoRetrieval,
};

use tracing::{debug, info};

use crate::constants::DEFAULT_TOP_K;
use crate::generation::{GenerationBackend, PromptContext, Topic, context_pack};
use crate::quality::{Comment, CommentController};
use crate::retry::Sleeper;

/// Produces comments for topics: context assembly followed by the quality gate.
pub struct CommentService<G, S, R> {
    controller: CommentController<G, S>,
    retriever: R,
    chain: Vec<String>,
    top_k: usize,
}

impl<G: GenerationBackend, S: Sleeper, R: ContextRetriever> CommentService<G, S, R> {
    /// `chain` is the ordered list of generation models tried on every attempt.
    pub fn new(controller: CommentController<G, S>, retriever: R, chain: Vec<String>) -> Self {
        Self {
            controller,
            retriever,
            chain,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Results taken from each corpus.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn controller(&self) -> &CommentController<G, S> {
        &self.controller
    }

    /// Returns comment text for a topic. Never fails.
    pub async fn produce_comment(
        &self,
        title: &str,
        body: &str,
        context: Option<Vec<String>>,
    ) -> String {
        self.produce(title, body, context).await.text
    }

    /// Like [`Self::produce_comment`] but keeps the comment's origin.
    pub async fn produce(&self, title: &str, body: &str, context: Option<Vec<String>>) -> Comment {
        let topic = Topic::new(title, body);
        let context = self.assemble_context(&topic, context).await;

        let comment = self
            .controller
            .produce_comment(&topic, &context, &self.chain)
            .await;

        info!(
            fallback = comment.is_fallback(),
            chars = comment.text.chars().count(),
            "Comment produced"
        );
        comment
    }

    async fn assemble_context(&self, topic: &Topic, supplied: Option<Vec<String>>) -> PromptContext {
        let mut context = match supplied {
            Some(snippets) if snippets.iter().any(|s| !s.trim().is_empty()) => {
                debug!(snippets = snippets.len(), "Using caller-supplied context");
                return PromptContext::new(snippets);
            }
            _ => self.retriever.retrieve(&topic.text(), self.top_k).await,
        };

        if context.snippets.is_empty() {
            context.snippets = context_pack(&topic.text(), &self.controller.rules().required_marker);
            debug!(snippets = context.snippets.len(), "Using built-in context pack");
        }
        context
    }
}

impl<G, S, R> std::fmt::Debug for CommentService<G, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentService")
            .field("chain", &self.chain)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}
