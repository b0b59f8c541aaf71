//! Cache shard reader.
use std::collections::HashMap;
use std::path::Path;

use log::error;

use crate::error::Error;
use crate::io::gz_lines;
use crate::records::CacheRow;

/// Load a cache shard. Same per-line tolerance as the raw reader.
pub fn read_cache_shard(path: &Path) -> Result<Vec<CacheRow>, Error> {
    let mut rows = Vec::new();
    for line in gz_lines(path)? {
        let line = line?;
        match CacheRow::from_json_line(&line) {
            Ok(row) => rows.push(row),
            Err(e) => error!("{:?}: dropped cache line: {:?}", path, e),
        }
    }
    Ok(rows)
}

/// Load a cache shard keyed by post id, for joining scores by id.
pub fn read_cache_shard_by_id(path: &Path) -> Result<HashMap<i64, CacheRow>, Error> {
    let rows = read_cache_shard(path)?;
    Ok(rows.into_iter().map(|r| (r.id, r)).collect())
}
