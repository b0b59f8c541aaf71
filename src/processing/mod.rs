//! Corpus-level operations around the pipelines.
pub mod convert;
pub mod prune;
pub mod resume;
