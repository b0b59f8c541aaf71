//! Output artifact writers.
pub mod graph;
pub mod scored;

pub use scored::{scored_artifact_name, ScoredRow, ScoredShardWriter};
