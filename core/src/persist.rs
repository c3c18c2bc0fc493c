use crate::error::LoadError;
use crate::model::{SearchIndex, FORMAT_VERSION};
use anyhow::Result;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs::{create_dir_all, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.bin";
pub const EXPORT_FILE: &str = "searchindex.json";

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }
    fn index_tmp(&self) -> PathBuf {
        self.root.join("index.bin.tmp")
    }
    pub fn export(&self) -> PathBuf {
        self.root.join(EXPORT_FILE)
    }
}

/// Write the whole artifact to a temp file, then rename into place. An
/// interrupted build never leaves a torn `index.bin` behind.
pub fn save_index(paths: &IndexPaths, index: &SearchIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let bytes = bincode::serialize(index)?;
    let tmp = paths.index_tmp();
    let mut f = File::create(&tmp)?;
    f.write_all(&bytes)?;
    f.sync_all()?;
    rename(&tmp, paths.index())?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> std::result::Result<SearchIndex, LoadError> {
    let mut f = File::open(paths.index())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index: SearchIndex =
        bincode::deserialize(&buf).map_err(|e| LoadError::Corrupt(e.to_string()))?;
    if index.meta.format_version != FORMAT_VERSION {
        return Err(LoadError::FormatVersion {
            found: index.meta.format_version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(index)
}

/// JSON rendition for a browser-side search widget: document name, title and
/// filename tables, section titles with their anchors, and the raw term
/// table. Keys are sorted so repeated exports are byte-identical.
pub fn export_json(index: &SearchIndex) -> serde_json::Value {
    let docnames: Vec<&str> = index.docs.iter().map(|d| d.external_id.as_str()).collect();
    let titles: Vec<&str> = index.docs.iter().map(|d| d.title.as_str()).collect();
    let filenames: Vec<&str> =
        index.docs.iter().map(|d| d.path.as_deref().unwrap_or("")).collect();

    let mut alltitles: BTreeMap<&str, Vec<serde_json::Value>> = BTreeMap::new();
    for (doc_id, doc) in index.docs.iter().enumerate() {
        for section in &doc.sections {
            alltitles
                .entry(section.title.as_str())
                .or_default()
                .push(json!([doc_id, section.anchor]));
        }
    }

    let mut terms: BTreeMap<&str, Vec<serde_json::Value>> = BTreeMap::new();
    for (term, term_id) in &index.dictionary {
        let list = index.occurrences.get(term_id).map(Vec::as_slice).unwrap_or(&[]);
        let entries: Vec<serde_json::Value> =
            list.iter().map(|o| json!([o.doc_id, o.section, o.weight])).collect();
        terms.insert(term.as_str(), entries);
    }

    json!({
        "docnames": docnames,
        "titles": titles,
        "filenames": filenames,
        "alltitles": alltitles,
        "terms": terms,
        "meta": index.meta,
    })
}

pub fn save_export(paths: &IndexPaths, index: &SearchIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.export())?;
    let rendered = serde_json::to_string_pretty(&export_json(index))?;
    f.write_all(rendered.as_bytes())?;
    Ok(())
}
