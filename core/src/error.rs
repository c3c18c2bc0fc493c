use thiserror::Error;

/// Corpus validation failures. The build aborts on the first one and no
/// partial index is ever produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("duplicate document id: {0}")]
    DuplicateId(String),

    #[error("document {0} has an empty title")]
    EmptyTitle(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no index has been built or loaded")]
    Unbuilt,
}

/// Failures loading a persisted index artifact.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading index artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("index artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("unsupported index format version {found} (expected {expected})")]
    FormatVersion { found: u32, expected: u32 },
}
