//! Pipelines.
//!
//! The two corpus passes are implemented here, behind a light
//! [pipeline::Pipeline] trait.
pub mod collocation;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod scoring;

pub use collocation::Collocation;
pub use pipeline::Pipeline;
pub use scoring::Scoring;
