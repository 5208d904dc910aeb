//! Top-k semantic search over named corpora.

pub mod corpus;
pub mod error;
pub mod service;
pub mod similarity;


pub use corpus::{Corpus, CorpusEntry, CorpusProvider, InMemoryCorpusProvider};
pub use error::RetrievalError;
pub use service::{RetrievalResult, RetrievalService};
pub use similarity::cosine_similarity;
