//! Scoring pass.
pub mod pipeline;
pub mod worker;

pub use pipeline::Scoring;
pub use worker::{Outcome, ScoringContext, ShardWorker};
