pub mod builder;
pub mod error;
pub mod model;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use error::{BuildError, LoadError, QueryError};
pub use model::{
    DocId, DocMeta, DocumentSource, IndexMeta, IndexState, Occurrence, SearchIndex, Section,
    TermId, FORMAT_VERSION,
};
pub use query::{Hit, QueryMode};
pub use tokenizer::{Tokenizer, TokenizerConfig};
