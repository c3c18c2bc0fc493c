use crate::model::{DocId, SearchIndex, Section};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Match documents containing at least one query term.
    #[default]
    Any,
    /// Match only documents containing every query term.
    All,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub external_id: String,
    pub title: String,
    pub path: Option<String>,
    pub score: f32,
    /// Section headings the query terms matched, in document order.
    pub matched_sections: Vec<Section>,
}

/// Rank documents for a query against an immutable index. Scores sum the
/// matched occurrence weights; ties break on external id so repeated queries
/// always return the same order. Read-only, safe under concurrent callers.
pub fn search(index: &SearchIndex, query: &str, mode: QueryMode) -> Vec<Hit> {
    let tokenizer = Tokenizer::new(index.tokenizer);
    let terms: BTreeSet<String> = tokenizer.tokenize(query).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scores: HashMap<DocId, f32> = HashMap::new();
    let mut matched_sections: HashMap<DocId, BTreeSet<u32>> = HashMap::new();
    let mut per_term_docs: Vec<HashSet<DocId>> = Vec::with_capacity(terms.len());

    for term in &terms {
        let postings = index
            .dictionary
            .get(term)
            .and_then(|term_id| index.occurrences.get(term_id));
        match postings {
            Some(list) => {
                let mut docs_for_term = HashSet::new();
                for occurrence in list {
                    *scores.entry(occurrence.doc_id).or_insert(0.0) += occurrence.weight;
                    if let Some(section) = occurrence.section {
                        matched_sections.entry(occurrence.doc_id).or_default().insert(section);
                    }
                    docs_for_term.insert(occurrence.doc_id);
                }
                per_term_docs.push(docs_for_term);
            }
            // A term absent from the corpus matches nothing; conjunctive
            // queries fail outright.
            None if mode == QueryMode::All => return Vec::new(),
            None => {}
        }
    }

    if mode == QueryMode::All {
        scores.retain(|doc_id, _| per_term_docs.iter().all(|docs| docs.contains(doc_id)));
    }

    let mut ranked: Vec<(DocId, f32)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| external_id(index, a.0).cmp(external_id(index, b.0)))
    });

    ranked
        .into_iter()
        .filter_map(|(doc_id, score)| {
            index.doc(doc_id).map(|meta| {
                let sections = matched_sections
                    .get(&doc_id)
                    .map(|indices| {
                        indices
                            .iter()
                            .filter_map(|&i| meta.sections.get(i as usize).cloned())
                            .collect()
                    })
                    .unwrap_or_default();
                Hit {
                    doc_id,
                    external_id: meta.external_id.clone(),
                    title: meta.title.clone(),
                    path: meta.path.clone(),
                    score,
                    matched_sections: sections,
                }
            })
        })
        .collect()
}

fn external_id(index: &SearchIndex, doc_id: DocId) -> &str {
    index.doc(doc_id).map(|meta| meta.external_id.as_str()).unwrap_or("")
}
