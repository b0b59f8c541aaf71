//! Shard discovery and raw/cache reconciliation.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{date_key, Shard};
use crate::error::Error;

/// Result of reconciling the raw and cache file sets of a corpus directory.
///
/// `pairs` is the intersection by date key, sorted by date key.
/// `orphans` holds the file names present on only one side, sorted; they
/// are excluded from any work list but never deleted.
#[derive(Debug)]
pub struct ShardInventory {
    pub pairs: Vec<Shard>,
    pub orphans: Vec<String>,
}

fn collect(dir: &Path, pattern: &str) -> Result<BTreeMap<String, PathBuf>, Error> {
    let pattern = dir.join(pattern);
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::InvalidPath(dir.to_path_buf()))?;

    let mut found = BTreeMap::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        match date_key(&path) {
            Some(key) => {
                if let Some(previous) = found.insert(key.clone(), path.clone()) {
                    warn!(
                        "two files share date key {}: {:?} replaces {:?}",
                        key, path, previous
                    );
                }
            }
            None => warn!("could not extract a date key from {:?}, ignoring", path),
        }
    }
    Ok(found)
}

/// Enumerate the shards of `dir`, pairing raw archives with cache shards.
///
/// Fails with [Error::InvalidPath] if `dir` is not a directory: that is an
/// operator error and callers abort on it. Zero pairs is valid (empty
/// corpus or nothing converted yet) and only logged.
pub fn inventory(dir: &Path) -> Result<ShardInventory, Error> {
    if !dir.is_dir() {
        return Err(Error::InvalidPath(dir.to_path_buf()));
    }

    let raws = collect(dir, "*.json.gz")?;
    let caches = collect(dir, "*.cache.gz")?;

    let mut pairs = Vec::new();
    let mut orphans = Vec::new();

    for (key, raw_path) in &raws {
        match caches.get(key) {
            Some(cache_path) => pairs.push(Shard {
                date_key: key.clone(),
                raw_path: raw_path.clone(),
                cache_path: cache_path.clone(),
            }),
            None => orphans.push(file_name(raw_path)),
        }
    }
    for (key, cache_path) in &caches {
        if !raws.contains_key(key) {
            orphans.push(file_name(cache_path));
        }
    }
    orphans.sort();

    if !orphans.is_empty() {
        info!(
            "{} shard file(s) have no counterpart and were removed from consideration: {:?}",
            orphans.len(),
            orphans
        );
    }
    if pairs.is_empty() {
        warn!("no matched shard pairs in {:?}", dir);
    } else {
        info!("{} matched shard pair(s) in {:?}", pairs.len(), dir);
    }

    Ok(ShardInventory { pairs, orphans })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
