//! Modularity table.
//!
//! Community classes come from an external graph analysis and are treated
//! as input data: a space-delimited CSV with header
//! `Label Appearances Modularity`.
use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
struct ModularityRow {
    #[serde(rename = "Label")]
    label: String,
    #[allow(dead_code)]
    #[serde(rename = "Appearances")]
    appearances: u64,
    #[serde(rename = "Modularity")]
    modularity: i32,
}

#[derive(Debug, Default)]
pub struct ModularityTable {
    rows: Vec<ModularityRow>,
}

impl ModularityTable {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new().delimiter(b' ').from_path(path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(Self { rows })
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<(String, u64, i32)>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|(label, appearances, modularity)| ModularityRow {
                    label,
                    appearances,
                    modularity,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Hashtags belonging to any of the given classes.
    pub fn hashtags_in_classes(&self, classes: &[i32]) -> HashSet<String> {
        let classes: HashSet<i32> = classes.iter().copied().collect();
        self.rows
            .iter()
            .filter(|r| classes.contains(&r.modularity))
            .map(|r| r.label.clone())
            .collect()
    }

    /// Number of distinct classes in the table.
    pub fn class_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.modularity)
            .collect::<HashSet<_>>()
            .len()
    }
}
