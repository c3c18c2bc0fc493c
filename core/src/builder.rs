use crate::error::BuildError;
use crate::model::{
    DocId, DocMeta, DocumentSource, IndexMeta, Occurrence, SearchIndex, TermId, FORMAT_VERSION,
};
use crate::tokenizer::{Tokenizer, TokenizerConfig};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Field weights: a title hit outranks a section-heading hit outranks a body
/// hit. Repeated occurrences within a field accumulate.
pub const TITLE_WEIGHT: f32 = 5.0;
pub const SECTION_WEIGHT: f32 = 2.0;
pub const BODY_WEIGHT: f32 = 1.0;

/// Documents per parallel partition. Fixed so partitioning does not depend
/// on thread count.
const CHUNK: usize = 64;

type PartialTable = HashMap<String, Vec<Occurrence>>;

/// Pure corpus-to-index transformation. Validates, tokenizes title, section
/// headings and body with distinct weights, and merges partial term tables
/// deterministically. The caller persists the result.
pub struct IndexBuilder {
    tokenizer: Tokenizer,
}

impl IndexBuilder {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { tokenizer: Tokenizer::new(config) }
    }

    pub fn build(&self, sources: Vec<DocumentSource>) -> Result<SearchIndex, BuildError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(sources.len());
        for src in &sources {
            if src.title.trim().is_empty() {
                return Err(BuildError::EmptyTitle(src.id.clone()));
            }
            if !seen.insert(&src.id) {
                return Err(BuildError::DuplicateId(src.id.clone()));
            }
        }

        // Doc ids follow input order, fixed before any parallel work so the
        // partitioning cannot influence them.
        let partials: Vec<PartialTable> = sources
            .par_chunks(CHUNK)
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                let mut table = PartialTable::new();
                for (offset, src) in chunk.iter().enumerate() {
                    let doc_id = (chunk_idx * CHUNK + offset) as DocId;
                    self.index_document(doc_id, src, &mut table);
                }
                table
            })
            .collect();

        // Merge partial tables per term, then impose a total order on every
        // occurrence list so the result is independent of scheduling.
        let mut merged: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        for table in partials {
            for (term, occurrences) in table {
                merged.entry(term).or_default().extend(occurrences);
            }
        }

        // Term ids come from the sorted term set, so rebuilding the same
        // corpus reproduces identical ids.
        let mut dictionary: HashMap<String, TermId> = HashMap::with_capacity(merged.len());
        let mut occurrences: HashMap<TermId, Vec<Occurrence>> = HashMap::with_capacity(merged.len());
        for (term_id, (term, mut list)) in merged.into_iter().enumerate() {
            list.sort_by_key(|o| (o.doc_id, o.section));
            dictionary.insert(term, term_id as TermId);
            occurrences.insert(term_id as TermId, list);
        }

        let num_docs = sources.len() as u32;
        let docs: Vec<DocMeta> = sources
            .into_iter()
            .map(|src| DocMeta {
                external_id: src.id,
                title: src.title,
                path: src.path,
                sections: src.sections,
            })
            .collect();

        tracing::info!(num_docs, num_terms = dictionary.len(), "index built");

        Ok(SearchIndex {
            tokenizer: self.tokenizer.config(),
            dictionary,
            occurrences,
            docs,
            meta: IndexMeta {
                num_docs,
                created_at: String::new(),
                builder_version: env!("CARGO_PKG_VERSION").to_string(),
                format_version: FORMAT_VERSION,
            },
        })
    }

    fn index_document(&self, doc_id: DocId, src: &DocumentSource, table: &mut PartialTable) {
        // One occurrence per (term, section slot); weights within the slot sum.
        let mut weights: HashMap<(String, Option<u32>), f32> = HashMap::new();
        for term in self.tokenizer.tokenize(&src.title) {
            *weights.entry((term, None)).or_insert(0.0) += TITLE_WEIGHT;
        }
        for (i, section) in src.sections.iter().enumerate() {
            for term in self.tokenizer.tokenize(&section.title) {
                *weights.entry((term, Some(i as u32))).or_insert(0.0) += SECTION_WEIGHT;
            }
        }
        for term in self.tokenizer.tokenize(&src.body) {
            *weights.entry((term, None)).or_insert(0.0) += BODY_WEIGHT;
        }
        for ((term, section), weight) in weights {
            table.entry(term).or_default().push(Occurrence { doc_id, section, weight });
        }
    }
}
