use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenizer options. Recorded inside the index so runtime queries are
/// normalized exactly like the documents were at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub fold_case: bool,
    pub stem: bool,
    pub strip_stopwords: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { fold_case: true, stem: true, strip_stopwords: true }
    }
}

/// Pure text-to-terms pipeline: NFKC normalization, optional case folding,
/// word extraction, optional stopword removal and stemming.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> TokenizerConfig {
        self.config
    }

    /// Lazy, finite stream of normalized terms. Restartable by calling again
    /// with the same input; output depends only on the input and the config.
    pub fn tokenize(&self, text: &str) -> Tokens {
        let normalized = text.nfkc().collect::<String>();
        let normalized = if self.config.fold_case { normalized.to_lowercase() } else { normalized };
        Tokens { config: self.config, text: normalized, at: 0 }
    }

    pub fn terms(&self, text: &str) -> Vec<String> {
        self.tokenize(text).collect()
    }
}

pub struct Tokens {
    config: TokenizerConfig,
    text: String,
    at: usize,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let mat = RE.find_at(&self.text, self.at)?;
            self.at = mat.end();
            let token = mat.as_str();
            if self.config.strip_stopwords && is_stopword(token) {
                continue;
            }
            return Some(if self.config.stem {
                STEMMER.stem(token).to_string()
            } else {
                token.to_string()
            });
        }
    }
}
