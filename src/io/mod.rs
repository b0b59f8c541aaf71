/*! Shard I/O.

Readers stream gzip-compressed, newline-delimited JSON; writers emit the
space-delimited tabular artifacts downstream tooling consumes.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Error;

pub mod reader;
pub mod writer;

/// Line iterator over a gzip-compressed file. Corpus files are gzipped and
/// may be multi-member, hence [MultiGzDecoder].
pub fn gz_lines(path: &Path) -> Result<Lines<BufReader<MultiGzDecoder<File>>>, Error> {
    let file = File::open(path)?;
    Ok(BufReader::new(MultiGzDecoder::new(file)).lines())
}
