/*! Resumability tracking.

Completion is recorded in an explicit manifest (`manifest.jsonl` in the
output directory, one JSON record per shard outcome) instead of being
parsed back out of artifact names. On load the manifest is reconciled
with the artifacts actually present: a `scored-<date>.csv` whose date key
is missing from the manifest still counts as done, so a date key present
in the output directory is never reprocessed.

Tracking is advisory only. Nothing here locks or reserves shards; two
concurrent runs against the same output directory can still race on a
shard, which the optional work-list shuffle mitigates but does not
prevent.
!*/
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{info, warn};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::shard::{date_key, Shard};

pub const MANIFEST_NAME: &str = "manifest.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardStatus {
    /// Scored and written.
    Done,
    /// Nothing in the shard matched the target set; the shard is done.
    Empty,
    /// Over the size guard. Not completed, but never auto-retried within a
    /// run; listed in the summary for manual follow-up.
    Oversize,
    Failed,
}

impl ShardStatus {
    /// Completed statuses are skipped on resume.
    pub fn is_completed(self) -> bool {
        matches!(self, ShardStatus::Done | ShardStatus::Empty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub date_key: String,
    pub status: ShardStatus,
    /// Posts written (Done) or that hit the guard (Oversize).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<usize>,
}

/// Read the manifest of `dst`, keeping the last status per date key.
/// Unparseable lines are skipped with a warning (a crashed writer can
/// leave a torn tail line).
pub fn load_manifest(dst: &Path) -> Result<HashMap<String, ShardStatus>, Error> {
    let path = dst.join(MANIFEST_NAME);
    let mut statuses = HashMap::new();
    if !path.exists() {
        return Ok(statuses);
    }

    for line in std::fs::read_to_string(&path)?.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ManifestEntry>(line) {
            Ok(entry) => {
                statuses.insert(entry.date_key, entry.status);
            }
            Err(e) => warn!("skipping bad manifest line {:?}: {}", line, e),
        }
    }
    Ok(statuses)
}

/// Date keys that must not be dispatched again: completed manifest entries
/// plus every scored artifact already in `dst`.
pub fn completed_keys(dst: &Path) -> Result<HashSet<String>, Error> {
    let mut completed: HashSet<String> = load_manifest(dst)?
        .into_iter()
        .filter(|(_, status)| status.is_completed())
        .map(|(key, _)| key)
        .collect();

    let pattern = dst.join("scored-*.csv");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::InvalidPath(dst.to_path_buf()))?;
    for artifact in glob::glob(pattern)? {
        let artifact = artifact?;
        if let Some(key) = date_key(&artifact) {
            completed.insert(key);
        }
    }
    Ok(completed)
}

/// Remove already-completed shards from the work list, optionally
/// shuffling the remainder (best-effort collision avoidance when several
/// independent runs share a shard pool, not a lock).
pub fn remaining(pairs: Vec<Shard>, dst: &Path, shuffle: bool) -> Result<Vec<Shard>, Error> {
    let completed = completed_keys(dst)?;
    let total = pairs.len();
    let mut work: Vec<Shard> = pairs
        .into_iter()
        .filter(|s| !completed.contains(&s.date_key))
        .collect();

    info!(
        "{}/{} shard(s) already completed, {} remaining",
        total - work.len(),
        total,
        work.len()
    );

    if shuffle {
        work.shuffle(&mut rand::thread_rng());
    }
    Ok(work)
}

/// Append-only manifest writer, shared across workers.
pub struct ManifestWriter {
    file: Mutex<File>,
}

impl ManifestWriter {
    pub fn open(dst: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dst.join(MANIFEST_NAME))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn record(
        &self,
        date_key: &str,
        status: ShardStatus,
        posts: Option<usize>,
    ) -> Result<(), Error> {
        let entry = ManifestEntry {
            date_key: date_key.to_string(),
            status,
            posts,
        };
        let line = serde_json::to_string(&entry)?;
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{}", line)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn shard(key: &str) -> Shard {
        Shard {
            date_key: key.to_string(),
            raw_path: PathBuf::from(format!("tweets-{}.json.gz", key)),
            cache_path: PathBuf::from(format!("tweets-{}.cache.gz", key)),
        }
    }

    #[test]
    fn manifest_roundtrip_keeps_last_status() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ManifestWriter::open(dir.path()).unwrap();
        writer.record("20220101", ShardStatus::Failed, None).unwrap();
        writer.record("20220101", ShardStatus::Done, Some(5)).unwrap();
        writer.record("20220102", ShardStatus::Oversize, Some(99999)).unwrap();
        drop(writer);

        let statuses = load_manifest(dir.path()).unwrap();
        assert_eq!(statuses["20220101"], ShardStatus::Done);
        assert_eq!(statuses["20220102"], ShardStatus::Oversize);
    }

    #[test]
    fn remaining_skips_done_and_empty_not_oversize_or_failed() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ManifestWriter::open(dir.path()).unwrap();
        writer.record("20220101", ShardStatus::Done, Some(5)).unwrap();
        writer.record("20220102", ShardStatus::Empty, None).unwrap();
        writer.record("20220103", ShardStatus::Oversize, None).unwrap();
        writer.record("20220104", ShardStatus::Failed, None).unwrap();
        drop(writer);

        let pairs = vec![
            shard("20220101"),
            shard("20220102"),
            shard("20220103"),
            shard("20220104"),
            shard("20220105"),
        ];
        let work = remaining(pairs, dir.path(), false).unwrap();
        let keys: Vec<_> = work.iter().map(|s| s.date_key.as_str()).collect();
        assert_eq!(keys, vec!["20220103", "20220104", "20220105"]);
    }

    #[test]
    fn artifact_on_disk_counts_as_completed_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("scored-20220101.csv")).unwrap();

        let work = remaining(vec![shard("20220101"), shard("20220102")], dir.path(), false)
            .unwrap();
        assert_eq!(work.len(), 1);
        assert_eq!(work[0].date_key, "20220102");
    }

    #[test]
    fn torn_manifest_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "{\"date_key\":\"20220101\",\"status\":\"done\"}\n{\"date_key\":\"2022",
        )
        .unwrap();

        let statuses = load_manifest(dir.path()).unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses["20220101"], ShardStatus::Done);
    }

    #[test]
    fn shuffle_keeps_the_same_work_set() {
        let dir = tempfile::tempdir().unwrap();
        let pairs: Vec<Shard> = (1..=9).map(|d| shard(&format!("2022010{}", d))).collect();
        let work = remaining(pairs.clone(), dir.path(), true).unwrap();

        let mut got: Vec<_> = work.iter().map(|s| s.date_key.clone()).collect();
        let mut expected: Vec<_> = pairs.iter().map(|s| s.date_key.clone()).collect();
        got.sort();
        expected.sort();
        assert_eq!(got, expected);
    }
}
