//! Raw shard reader.
//!
//! A raw shard is a gzipped archive of full tweet JSON, one object per
//! line. Decode failures are per-line: the line is dropped and logged,
//! never fatal. Ids are deduplicated within a shard (days are independent,
//! so no cross-shard dedup happens anywhere).
use std::collections::HashSet;
use std::path::Path;

use log::{debug, error};

use crate::error::Error;
use crate::io::gz_lines;
use crate::records::Post;

/// Load a raw shard into memory, dropping malformed lines and duplicate
/// ids. An error here is a whole-shard failure (unreadable file, corrupt
/// gzip stream), which callers treat per the Failed outcome.
pub fn read_raw_shard(path: &Path) -> Result<Vec<Post>, Error> {
    let mut posts = Vec::new();
    let mut seen = HashSet::new();
    let mut dropped = 0usize;

    for line in gz_lines(path)? {
        let line = line?;
        match Post::from_json_line(&line) {
            Ok(post) => {
                if seen.insert(post.id) {
                    posts.push(post);
                }
            }
            Err(e) => {
                dropped += 1;
                error!("{:?}: dropped line: {:?}", path, e);
            }
        }
    }

    if dropped > 0 {
        debug!("{:?}: {} malformed line(s) dropped", path, dropped);
    }
    Ok(posts)
}
