//! Named collections of precomputed `(text, vector)` pairs.
//!
//! Building and persisting these indexes happens elsewhere; this module only holds them in
//! memory and checks that every vector in one corpus has the same dimension.

use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::error::RetrievalError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorpusEntry {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
}

/// An ordered, dimension-consistent collection of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    name: String,
    entries: Vec<CorpusEntry>,
    dimension: usize,
}

impl Corpus {
    pub fn new(name: impl Into<String>, entries: Vec<CorpusEntry>) -> Result<Self, RetrievalError> {
        let name = name.into();
        let dimension = entries.first().map(|e| e.vector.len()).unwrap_or(0);

        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimension) {
            return Err(RetrievalError::InconsistentCorpus {
                corpus: name,
                reason: format!(
                    "entry '{}' has dimension {}, expected {}",
                    bad.id,
                    bad.vector.len(),
                    dimension
                ),
            });
        }
        if !entries.is_empty() && dimension == 0 {
            return Err(RetrievalError::InconsistentCorpus {
                corpus: name,
                reason: "entries have zero-length vectors".to_string(),
            });
        }

        Ok(Self {
            name,
            entries,
            dimension,
        })
    }

    /// Parses a JSON array of `{ "id", "text", "vector" }` objects.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, RetrievalError> {
        let name = name.into();
        let entries: Vec<CorpusEntry> =
            serde_json::from_str(json).map_err(|e| RetrievalError::CorpusLoad {
                corpus: name.clone(),
                reason: e.to_string(),
            })?;
        Self::new(name, entries)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Vector length shared by every entry; `0` for an empty corpus.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Supplies corpora by name.
pub trait CorpusProvider: Send + Sync {
    fn corpus(&self, name: &str) -> Result<Arc<Corpus>, RetrievalError>;
}

/// Corpora held in memory, registered up front.
#[derive(Debug, Default)]
pub struct InMemoryCorpusProvider {
    corpora: RwLock<HashMap<String, Arc<Corpus>>>,
}

impl InMemoryCorpusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, corpus: Corpus) {
        self.corpora
            .write()
            .insert(corpus.name().to_string(), Arc::new(corpus));
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.corpora.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Loads `<dir>/<name>.json` for each name. Missing files are skipped.
    pub fn load_dir(dir: &Path, names: &[&str]) -> Result<Self, RetrievalError> {
        let provider = Self::new();

        for name in names {
            let path = dir.join(format!("{name}.json"));
            if !path.is_file() {
                continue;
            }
            let json = std::fs::read_to_string(&path).map_err(|e| RetrievalError::CorpusLoad {
                corpus: (*name).to_string(),
                reason: e.to_string(),
            })?;
            let corpus = Corpus::from_json(*name, &json)?;
            info!(
                corpus = name,
                entries = corpus.len(),
                dim = corpus.dimension(),
                "Corpus loaded"
            );
            provider.insert(corpus);
        }

        Ok(provider)
    }
}

impl CorpusProvider for InMemoryCorpusProvider {
    fn corpus(&self, name: &str) -> Result<Arc<Corpus>, RetrievalError> {
        self.corpora
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RetrievalError::CorpusNotFound {
                name: name.to_string(),
            })
    }
}
