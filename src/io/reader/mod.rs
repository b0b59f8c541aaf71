//! Raw and cache shard readers.
pub mod cache;
pub mod raw;

pub use cache::read_cache_shard;
pub use raw::read_raw_shard;
