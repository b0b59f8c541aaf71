//! Per-shard scored output.
//!
//! One space-delimited CSV per shard, named `scored-<date_key>.csv`. The
//! date key position in the name is load-bearing: the resume layer counts
//! an artifact's date key as completed work. Text content is dropped from
//! the output to keep artifacts small.
//!
//! Rows go to a `.tmp` sibling first and the file is renamed on commit, so
//! a failed shard never leaves a partial artifact behind.
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Artifact file name for a date key.
pub fn scored_artifact_name(date_key: &str) -> String {
    format!("scored-{}.csv", date_key)
}

/// One output row. Column order is fixed and matches the header.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub id: i64,
    pub timestamp: Option<String>,
    pub quoted_id: Option<i64>,
    pub hashtags: Vec<String>,
    pub botscore: Option<f64>,
    pub sentiment: i64,
    pub toxicity: f32,
}

pub struct ScoredShardWriter {
    writer: csv::Writer<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
}

impl ScoredShardWriter {
    /// Open the `.tmp` file and write the header row.
    pub fn create(dst: &Path, date_key: &str) -> Result<Self, Error> {
        let final_path = dst.join(scored_artifact_name(date_key));
        let tmp_path = final_path.with_extension("csv.tmp");

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .from_path(&tmp_path)?;
        writer.write_record([
            "id",
            "timestamp",
            "quoted_id",
            "hashtags",
            "botscore",
            "sentiment",
            "toxicity",
        ])?;

        Ok(Self {
            writer,
            tmp_path,
            final_path,
        })
    }

    pub fn write_row(&mut self, row: &ScoredRow) -> Result<(), Error> {
        self.writer.write_record([
            row.id.to_string(),
            row.timestamp.clone().unwrap_or_default(),
            row.quoted_id.map(|q| q.to_string()).unwrap_or_default(),
            row.hashtags.join(","),
            row.botscore.map(|b| b.to_string()).unwrap_or_default(),
            row.sentiment.to_string(),
            row.toxicity.to_string(),
        ])?;
        Ok(())
    }

    /// Flush and move the artifact to its final name.
    pub fn commit(mut self) -> Result<PathBuf, Error> {
        self.writer.flush()?;
        drop(self.writer);
        fs::rename(&self.tmp_path, &self.final_path)?;
        Ok(self.final_path)
    }

    /// Remove the partial `.tmp` file.
    pub fn abort(self) {
        drop(self.writer);
        let _ = fs::remove_file(&self.tmp_path);
    }
}
