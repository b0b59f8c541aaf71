//! Cache shard derivation.
//!
//! Flattens each raw archive into its cache counterpart
//! (`<stem>.cache.gz`): one light JSON row per tweet, carrying only the
//! fields the pipelines need, so later passes avoid re-parsing full tweet
//! objects. Shards are converted in parallel; a shard that fails is logged
//! and skipped, the rest of the corpus still converts.
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::{error, info};
use rayon::prelude::*;

use crate::error::Error;
use crate::io::gz_lines;
use crate::records::CacheRow;

/// Derive cache shards for every `*.json.gz` in `src`, writing next to the
/// raws when `dst` equals `src` or into `dst` otherwise.
pub fn convert_corpus(src: &Path, dst: &Path) -> Result<(), Error> {
    if !src.is_dir() {
        return Err(Error::InvalidPath(src.to_path_buf()));
    }
    std::fs::create_dir_all(dst)?;

    let pattern = src.join("*.json.gz");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::InvalidPath(src.to_path_buf()))?;
    let raws: Vec<PathBuf> = glob::glob(pattern)?.collect::<Result<_, _>>()?;
    info!("{} raw shard(s) to convert", raws.len());

    let errors: Vec<Error> = raws
        .into_par_iter()
        .filter_map(|raw| match convert_shard(&raw, dst) {
            Ok(rows) => {
                info!("{:?}: {} cache row(s)", raw, rows);
                None
            }
            Err(e) => Some(e),
        })
        .collect();

    for error in &errors {
        error!("{:?}", error);
    }
    Ok(())
}

fn convert_shard(raw: &Path, dst: &Path) -> Result<usize, Error> {
    let name = raw
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidPath(raw.to_path_buf()))?;
    let stem = name.split('.').next().unwrap_or(name);
    let cache_path = dst.join(format!("{}.cache.gz", stem));
    let tmp_path = dst.join(format!("{}.cache.gz.tmp", stem));

    // stage to .tmp so a failed conversion never leaves a partial cache
    // shard that a later inventory would pair with its raw
    match write_cache_shard(raw, &tmp_path) {
        Ok(written) => {
            std::fs::rename(&tmp_path, &cache_path)?;
            Ok(written)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn write_cache_shard(raw: &Path, tmp_path: &Path) -> Result<usize, Error> {
    let mut enc = GzEncoder::new(File::create(tmp_path)?, Compression::default());
    let mut seen = HashSet::new();
    let mut written = 0usize;

    for line in gz_lines(raw)? {
        let line = line?;
        match CacheRow::from_raw_json_line(&line) {
            Ok(row) => {
                if seen.insert(row.id) {
                    writeln!(enc, "{}", serde_json::to_string(&row)?)?;
                    written += 1;
                }
            }
            Err(e) => error!("{:?}: dropped line: {:?}", raw, e),
        }
    }
    enc.finish()?;
    Ok(written)
}
