use docdex_core::persist::{export_json, load_index, save_export, save_index, IndexPaths};
use docdex_core::{DocumentSource, IndexBuilder, LoadError, Section, TokenizerConfig};
use std::fs;
use tempfile::tempdir;

fn tiny_index() -> docdex_core::SearchIndex {
    IndexBuilder::new(TokenizerConfig::default())
        .build(vec![
            DocumentSource {
                id: "azure_setup".into(),
                title: "Azure setup".into(),
                path: Some("azure_setup.md".into()),
                body: "create a storage account and upload data".into(),
                sections: vec![Section {
                    anchor: "create-a-datastore".into(),
                    title: "Create a datastore".into(),
                }],
            },
            DocumentSource {
                id: "plotting".into(),
                title: "Plotting".into(),
                path: Some("plotting.md".into()),
                body: "plot random images and masks".into(),
                sections: Vec::new(),
            },
        ])
        .unwrap()
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = tiny_index();
    save_index(&paths, &index).unwrap();

    let loaded = load_index(&paths).unwrap();
    assert_eq!(loaded.dictionary, index.dictionary);
    assert_eq!(loaded.num_docs(), index.num_docs());
    assert_eq!(loaded.meta.format_version, index.meta.format_version);
}

#[test]
fn missing_artifact_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn truncated_artifact_is_corrupt() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_index(&paths, &tiny_index()).unwrap();

    let bytes = fs::read(paths.index()).unwrap();
    fs::write(paths.index(), &bytes[..bytes.len() / 2]).unwrap();

    let err = load_index(&paths).unwrap_err();
    assert!(matches!(err, LoadError::Corrupt(_)));
}

#[test]
fn export_lists_doc_tables_and_anchors() {
    let index = tiny_index();
    let exported = export_json(&index);

    let docnames: Vec<&str> = exported["docnames"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(docnames, vec!["azure_setup", "plotting"]);
    assert_eq!(exported["titles"][0], "Azure setup");
    assert_eq!(exported["filenames"][1], "plotting.md");

    let entry = &exported["alltitles"]["Create a datastore"][0];
    assert_eq!(entry[0], 0);
    assert_eq!(entry[1], "create-a-datastore");

    // Term table holds the stemmed form
    assert!(exported["terms"].get("plot").is_some());
}

#[test]
fn export_writes_a_file() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_export(&paths, &tiny_index()).unwrap();
    let text = fs::read_to_string(paths.export()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["docnames"].as_array().unwrap().len(), 2);
}
