use criterion::{criterion_group, criterion_main, Criterion};
use docdex_core::tokenizer::{Tokenizer, TokenizerConfig};

const SAMPLE: &str = "To plot random images and masks for an overview of the dataset, \
create a storage account and upload the data, then grant rights to the service principal. \
The development environment uses a conda environment and the documentation is built from \
Markdown sources with per-section anchors for client-side search.";

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::new(TokenizerConfig::default());
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenizer.terms(SAMPLE)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
