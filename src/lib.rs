/*! # Macaw

Batch pipeline for sharded tweet corpora: builds hashtag collocation
graphs and enriches target communities with sentiment and toxicity
scores.

The corpus is a directory of date-keyed shard pairs (raw gzip NDJSON
archives plus light cache shards). The [pipelines::Collocation] pass
streams the whole corpus once, producing a co-occurrence graph and a
hashtag → post-id index; the [pipelines::Scoring] pass uses that index
plus an externally computed community classification to score the posts
that matter, one resumable artifact per shard.
!*/
pub mod error;
pub mod index;
pub mod io;
pub mod nlp;
pub mod pipelines;
pub mod processing;
pub mod progress;
pub mod records;
pub mod shard;
