//! Toxicity classifier interface.
//!
//! The real classifier is an external model; the pipeline only depends on
//! this trait. [KeywordModel] is the shipped reference implementation: a
//! binary 0/1 classification against a term list, matching the output
//! domain of the classifier it stands in for.
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;

use crate::error::Error;

pub trait ToxicityModel: Send {
    /// Classify one cleaned text. The score is binary: 1.0 toxic, 0.0 not.
    fn predict(&self, text: &str) -> Result<f32, Error>;
}

/// Term-list classifier: toxic iff any whitespace token is on the list.
#[derive(Debug, Default)]
pub struct KeywordModel {
    terms: HashSet<String>,
}

impl KeywordModel {
    /// Load a newline-delimited term list.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let terms: HashSet<String> = fs::read_to_string(path)?
            .lines()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        info!("loaded {} toxicity term(s) from {:?}", terms.len(), path);
        Ok(Self { terms })
    }

    #[cfg(test)]
    pub fn from_terms(terms: &[&str]) -> Self {
        Self {
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ToxicityModel for KeywordModel {
    fn predict(&self, text: &str) -> Result<f32, Error> {
        let toxic = text
            .split_whitespace()
            .any(|t| self.terms.contains(&t.to_lowercase()));
        Ok(if toxic { 1.0 } else { 0.0 })
    }
}
