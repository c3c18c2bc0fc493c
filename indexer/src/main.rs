use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docdex_core::persist::{load_index, save_export, save_index, IndexPaths};
use docdex_core::{DocumentSource, IndexBuilder, IndexState, QueryMode, Section, TokenizerConfig};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docdex-indexer")]
#[command(about = "Build and inspect the documentation search index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from Markdown/JSON/JSONL sources
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Also write a searchindex.json for browser-side widgets
        #[arg(long, default_value_t = false)]
        emit_json: bool,
        /// Index terms without stemming
        #[arg(long, default_value_t = false)]
        no_stem: bool,
        /// Index stopwords instead of dropping them
        #[arg(long, default_value_t = false)]
        keep_stopwords: bool,
    },
    /// Run a query against a built index
    Search {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Query string
        #[arg(long)]
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Require every query term to match
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Print document/term/occurrence counts for a built index
    Stats {
        /// Index directory
        #[arg(long)]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, emit_json, no_stem, keep_stopwords } => {
            build(&input, &output, emit_json, no_stem, keep_stopwords)
        }
        Commands::Search { index, query, k, all } => search(&index, &query, k, all),
        Commands::Stats { index } => stats(&index),
    }
}

fn build(
    input: &str,
    output: &str,
    emit_json: bool,
    no_stem: bool,
    keep_stopwords: bool,
) -> Result<()> {
    let sources = collect_sources(Path::new(input))?;
    anyhow::ensure!(!sources.is_empty(), "no indexable documents under {input}");
    tracing::info!(num_sources = sources.len(), "collected document sources");

    let config = TokenizerConfig {
        fold_case: true,
        stem: !no_stem,
        strip_stopwords: !keep_stopwords,
    };
    let mut index = IndexBuilder::new(config).build(sources)?;
    index.meta.created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::new());

    let paths = IndexPaths::new(output);
    save_index(&paths, &index)?;
    if emit_json {
        save_export(&paths, &index)?;
    }
    tracing::info!(output = %paths.root.display(), "index build complete");
    Ok(())
}

fn search(index_dir: &str, query: &str, k: usize, all: bool) -> Result<()> {
    let index = load_index(&IndexPaths::new(index_dir))?;
    let state = IndexState::built(index);
    let mode = if all { QueryMode::All } else { QueryMode::Any };
    let hits = state.search(query, mode)?;

    let total = hits.len();
    for (rank, hit) in hits.into_iter().take(k.max(1)).enumerate() {
        let anchors: Vec<&str> = hit.matched_sections.iter().map(|s| s.anchor.as_str()).collect();
        println!(
            "{:>2}. {:.3}  {}  {}{}",
            rank + 1,
            hit.score,
            hit.external_id,
            hit.title,
            if anchors.is_empty() { String::new() } else { format!("  [{}]", anchors.join(", ")) },
        );
    }
    println!("{total} hit(s)");
    Ok(())
}

fn stats(index_dir: &str) -> Result<()> {
    let index = load_index(&IndexPaths::new(index_dir))?;
    println!("documents:   {}", index.num_docs());
    println!("terms:       {}", index.num_terms());
    println!("occurrences: {}", index.num_occurrences());
    println!("created_at:  {}", index.meta.created_at);
    println!("builder:     {}", index.meta.builder_version);
    Ok(())
}

fn collect_sources(input: &Path) -> Result<Vec<DocumentSource>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "md" | "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    // Walk order is platform-dependent; doc ids must not be.
    files.sort();

    let mut sources = Vec::new();
    for file in files {
        match file.extension().and_then(|s| s.to_str()) {
            Some("md") => sources.push(read_markdown(input, &file)?),
            Some("jsonl") => read_jsonl(&file, &mut sources)?,
            _ => read_json(&file, &mut sources)?,
        }
    }
    Ok(sources)
}

fn read_markdown(root: &Path, file: &Path) -> Result<DocumentSource> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let rel = file.strip_prefix(root).unwrap_or(file);
    let id = rel
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let path = rel.to_string_lossy().replace('\\', "/");
    Ok(parse_markdown(id, Some(path), &text))
}

/// First heading becomes the document title; every later heading becomes a
/// section with a slugified anchor. Non-heading lines form the body.
fn parse_markdown(id: String, path: Option<String>, text: &str) -> DocumentSource {
    let mut title: Option<String> = None;
    let mut sections: Vec<Section> = Vec::new();
    let mut body = String::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        let hashes = trimmed.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&hashes) && trimmed[hashes..].starts_with(' ') {
            let heading = trimmed[hashes..].trim();
            if title.is_none() {
                title = Some(heading.to_string());
            } else {
                sections.push(Section { anchor: slugify(heading), title: heading.to_string() });
            }
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }

    DocumentSource { id, title: title.unwrap_or_default(), path, body, sections }
}

fn slugify(heading: &str) -> String {
    let mut slug = String::with_capacity(heading.len());
    let mut pending_dash = false;
    for c in heading.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn read_jsonl(file: &Path, sources: &mut Vec<DocumentSource>) -> Result<()> {
    let f = fs::File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        sources.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, sources: &mut Vec<DocumentSource>) -> Result<()> {
    let f = fs::File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                sources.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => sources.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}
