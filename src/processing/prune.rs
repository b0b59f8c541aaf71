//! Graph threshold filter.
//!
//! A blunt density-reduction step for visualisation: keep nodes whose
//! appearance count is strictly greater than the cutoff, and keep an edge
//! only when both endpoints survive.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Error;

/// Counts of surviving nodes and edges.
#[derive(Debug, PartialEq, Eq)]
pub struct PruneStats {
    pub nodes_kept: usize,
    pub edges_kept: usize,
}

/// Output name for a pruned table: `<stem>_<cutoff>plus.csv`.
fn pruned_name(src: &Path, cutoff: u64) -> PathBuf {
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    src.with_file_name(format!("{}_{}plus.csv", stem, cutoff))
}

/// Prune `nodes_src`/`edges_src` at `cutoff`, writing the filtered tables
/// next to `dst`. Expects the layouts produced by the collocation pass.
pub fn prune_graph(
    nodes_src: &Path,
    edges_src: &Path,
    dst: &Path,
    cutoff: u64,
) -> Result<PruneStats, Error> {
    if !dst.is_dir() {
        return Err(Error::InvalidPath(dst.to_path_buf()));
    }
    let nodes_dst = dst.join(
        pruned_name(nodes_src, cutoff)
            .file_name()
            .ok_or_else(|| Error::InvalidPath(nodes_src.to_path_buf()))?,
    );
    let edges_dst = dst.join(
        pruned_name(edges_src, cutoff)
            .file_name()
            .ok_or_else(|| Error::InvalidPath(edges_src.to_path_buf()))?,
    );

    // nodes pass builds the survivor set
    let mut nodes_reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .from_path(nodes_src)?;
    let mut nodes_writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .from_path(&nodes_dst)?;
    nodes_writer.write_record(["Label", "Appearances"])?;

    let mut survivors: HashSet<String> = HashSet::new();
    for record in nodes_reader.records() {
        let record = record?;
        let label = record.get(0).unwrap_or_default();
        let appearances: u64 = record
            .get(1)
            .unwrap_or_default()
            .parse()
            .map_err(|e| Error::Custom(format!("bad appearance count for {:?}: {}", label, e)))?;
        if appearances > cutoff {
            survivors.insert(label.to_string());
            nodes_writer.write_record([label, &appearances.to_string()])?;
        }
    }
    nodes_writer.flush()?;

    // edges survive only with both endpoints
    let mut edges_reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .from_path(edges_src)?;
    let mut edges_writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .from_path(&edges_dst)?;
    edges_writer.write_record(["Source", "Target", "Weight"])?;

    let mut edges_kept = 0usize;
    for record in edges_reader.records() {
        let record = record?;
        let source = record.get(0).unwrap_or_default();
        let target = record.get(1).unwrap_or_default();
        if survivors.contains(source) && survivors.contains(target) {
            edges_writer.write_record(&record)?;
            edges_kept += 1;
        }
    }
    edges_writer.flush()?;

    let stats = PruneStats {
        nodes_kept: survivors.len(),
        edges_kept,
    };
    info!(
        "pruned at cutoff {}: {} node(s), {} edge(s) kept",
        cutoff, stats.nodes_kept, stats.edges_kept
    );
    Ok(stats)
}
