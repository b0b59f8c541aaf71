//! Text cleanup and tokenisation.
//!
//! Order matters and is fixed: trim, collapse whitespace, strip URLs,
//! split, lowercase, drop pure-punctuation tokens, drop stopwords.
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::error::Error;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(
        r"(http|ftp|https)://([\w_-]+(?:(?:\.[\w_-]+)+))([\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-])?"
    )
    .unwrap();
}

#[derive(Debug, Default)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a newline-delimited stopword list.
    pub fn with_stopwords(path: &Path) -> Result<Self, Error> {
        let stopwords: HashSet<String> = fs::read_to_string(path)?
            .lines()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        info!("loaded {} stopword(s) from {:?}", stopwords.len(), path);
        Ok(Self { stopwords })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
        let cleaned = URL_PATTERN.replace_all(&collapsed, "");

        cleaned
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|t| !t.chars().all(|c| c.is_ascii_punctuation()))
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn strips_urls_and_lowercases() {
        let t = Tokenizer::new();
        assert_eq!(
            t.tokenize("  Veja ISSO https://example.com/x?y=1 agora "),
            vec!["veja", "isso", "agora"]
        );
    }

    #[test]
    fn drops_punctuation_tokens() {
        let t = Tokenizer::new();
        assert_eq!(t.tokenize("sim ! nao ... ?"), vec!["sim", "nao"]);
    }

    #[test]
    fn stopwords_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stopwords.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "de\nque\n").unwrap();

        let t = Tokenizer::with_stopwords(&path).unwrap();
        assert_eq!(t.tokenize("nada de novo que importe"), vec!["nada", "novo", "importe"]);
    }
}
