use crate::error::QueryError;
use crate::query::{self, Hit, QueryMode};
use crate::tokenizer::TokenizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub type DocId = u32;
pub type TermId = u32;

/// Artifact layout version; bumped on any incompatible change.
pub const FORMAT_VERSION: u32 = 1;

/// A heading inside a document, addressable from search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub anchor: String,
    pub title: String,
}

/// Builder input: one indexable page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    pub id: String,
    pub title: String,
    pub path: Option<String>,
    pub body: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Per-document table kept in the index: titles, filenames, section anchors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    pub title: String,
    pub path: Option<String>,
    pub sections: Vec<Section>,
}

/// One posting: a term appears in a document, optionally in a specific
/// section heading. `section` indexes into the document's `sections`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub doc_id: DocId,
    pub section: Option<u32>,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub num_docs: u32,
    pub created_at: String,
    pub builder_version: String,
    pub format_version: u32,
}

/// The complete, immutable term-to-occurrence structure. Built once per
/// corpus; any content change rebuilds and replaces the whole instance.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchIndex {
    pub tokenizer: TokenizerConfig,
    pub dictionary: HashMap<String, TermId>,
    pub occurrences: HashMap<TermId, Vec<Occurrence>>,
    pub docs: Vec<DocMeta>,
    pub meta: IndexMeta,
}

impl SearchIndex {
    pub fn doc(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(doc_id as usize)
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    pub fn num_occurrences(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }
}

/// Index lifecycle: `Unbuilt` until a build or load succeeds, then `Built`
/// and immutable. Shared by `Arc` so concurrent readers need no locking.
#[derive(Debug, Clone, Default)]
pub enum IndexState {
    #[default]
    Unbuilt,
    Built(Arc<SearchIndex>),
}

impl IndexState {
    pub fn built(index: SearchIndex) -> Self {
        Self::Built(Arc::new(index))
    }

    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    pub fn get(&self) -> Result<&SearchIndex, QueryError> {
        match self {
            Self::Built(index) => Ok(index),
            Self::Unbuilt => Err(QueryError::Unbuilt),
        }
    }

    /// Query entry point; fails only when no index exists yet.
    pub fn search(&self, query: &str, mode: QueryMode) -> Result<Vec<Hit>, QueryError> {
        Ok(query::search(self.get()?, query, mode))
    }
}
