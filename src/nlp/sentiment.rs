//! Sentiment lexicon lookup.
//!
//! The lexicon is a `|`-delimited table with a word column first and
//! integer polarity columns `POL:N0` and `POL:N1` (the SentiLex-PT layout).
//! A post's sentiment is the sum of the polarity values of its tokens;
//! unknown tokens contribute zero, so the neutral score for an unscorable
//! post is 0.
use std::collections::HashMap;
use std::path::Path;

use log::info;

use crate::error::Error;

const POLARITY_COLUMNS: [&str; 2] = ["POL:N0", "POL:N1"];

#[derive(Debug, Default)]
pub struct SentimentLexicon {
    polarities: HashMap<String, i64>,
}

impl SentimentLexicon {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let mut polarity_idx = Vec::new();
        for column in POLARITY_COLUMNS {
            let idx = headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| Error::MissingColumn(column.to_string()))?;
            polarity_idx.push(idx);
        }

        let mut polarities: HashMap<String, i64> = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let word = match record.get(0) {
                Some(w) if !w.is_empty() => w.to_lowercase(),
                _ => continue,
            };
            // tolerate junk polarity cells, they count as zero
            let value: i64 = polarity_idx
                .iter()
                .filter_map(|&i| record.get(i))
                .filter_map(|v| v.trim().parse::<i64>().ok())
                .sum();
            *polarities.entry(word).or_insert(0) += value;
        }

        info!("loaded {} lexicon entr(ies) from {:?}", polarities.len(), path);
        Ok(Self { polarities })
    }

    #[cfg(test)]
    pub fn from_entries(entries: &[(&str, i64)]) -> Self {
        Self {
            polarities: entries
                .iter()
                .map(|(w, v)| (w.to_string(), *v))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.polarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polarities.is_empty()
    }

    /// Sum of token polarities. Unknown tokens score zero.
    pub fn score(&self, tokens: &[String]) -> i64 {
        tokens
            .iter()
            .filter_map(|t| self.polarities.get(t))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_polarity_columns_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentilex.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "word|PoS|POL:N0|POL:N1").unwrap();
        writeln!(f, "bom|Adj|1|1").unwrap();
        writeln!(f, "ruim|Adj|-1|-1").unwrap();
        writeln!(f, "estranho|Adj|0|x").unwrap();

        let lexicon = SentimentLexicon::from_path(&path).unwrap();
        assert_eq!(lexicon.len(), 3);

        let tokens: Vec<String> = ["bom", "ruim", "ruim", "desconhecido"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(lexicon.score(&tokens), 2 - 2 - 2);
    }

    #[test]
    fn missing_polarity_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "word|PoS").unwrap();
        writeln!(f, "bom|Adj").unwrap();

        assert!(matches!(
            SentimentLexicon::from_path(&path),
            Err(Error::MissingColumn(c)) if c == "POL:N0"
        ));
    }

    #[test]
    fn empty_token_list_is_neutral() {
        let lexicon = SentimentLexicon::from_entries(&[("bom", 2)]);
        assert_eq!(lexicon.score(&[]), 0);
    }
}
