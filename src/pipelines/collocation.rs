/*! Collocation pass.

Single-threaded stream over every matched shard of the corpus, reading the
cache side only (it is far lighter than the raw archives and carries the
hashtag lists). For each non-retweet post with at least `k` hashtags, the
sorted hashtag list yields all C(n,k) combinations, each incrementing a
global counter. Independently of `k`, every hashtag records the ids of the
posts that used it.

Memory grows with the number of distinct combinations, not with corpus
size; that is the scalability bound of this pass.

Artifacts, written once at the end of the pass:
- `<k>_hashtag_appearances.csv` (nodes),
- `<k>_hashtag_collocations.csv` (edges),
- `<k>_hashtag_postings.bin` (hashtag → post ids, for the scoring pass).
!*/
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use itertools::Itertools;
use log::{error, info};

use crate::error::Error;
use crate::index::Postings;
use crate::io::reader::read_cache_shard;
use crate::io::writer::graph;
use crate::pipelines::pipeline::Pipeline;
use crate::progress::Progress;
use crate::records::CacheRow;
use crate::shard::store;

/// Explicit accumulator for one aggregation pass; owns all the mutable
/// state the pass builds up. Counters only grow, so running two passes
/// over the same corpus doubles every count.
pub struct Accumulator {
    k: usize,
    counts: HashMap<Vec<String>, u64>,
    postings: Postings,
}

/// Finalized output of one pass.
pub struct CollocationGraph {
    /// Sorted by ascending weight, ties by combination.
    pub edges: Vec<(Vec<String>, u64)>,
    /// Appearance count per hashtag: sum of the weights of every edge
    /// touching it. Sorted by label.
    pub nodes: Vec<(String, u64)>,
    pub postings: Postings,
}

impl Accumulator {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            counts: HashMap::new(),
            postings: Postings::new(),
        }
    }

    /// Record one cache row. Retweets never count: engagement
    /// amplification must not inflate co-occurrence. Quotes do count.
    pub fn record(&mut self, row: &CacheRow) {
        if row.retweeted_id.is_some() || row.hashtags.is_empty() {
            return;
        }

        let mut tags: Vec<String> = row.hashtags.iter().map(|t| t.to_lowercase()).collect();
        tags.sort();
        tags.dedup();

        for tag in &tags {
            self.postings.insert(tag, row.id);
        }

        if tags.len() >= self.k {
            for combination in tags.into_iter().combinations(self.k) {
                *self.counts.entry(combination).or_insert(0) += 1;
            }
        }
    }

    pub fn distinct_collocations(&self) -> usize {
        self.counts.len()
    }

    pub fn finalize(self) -> CollocationGraph {
        let mut edges: Vec<(Vec<String>, u64)> = self.counts.into_iter().collect();
        edges.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let mut appearances: BTreeMap<String, u64> = BTreeMap::new();
        for (combination, weight) in &edges {
            for tag in combination {
                *appearances.entry(tag.clone()).or_insert(0) += weight;
            }
        }

        CollocationGraph {
            edges,
            nodes: appearances.into_iter().collect(),
            postings: self.postings,
        }
    }
}

/// The collocation pipeline: stream shards, aggregate, write artifacts.
pub struct Collocation {
    src: PathBuf,
    dst: PathBuf,
    k: usize,
}

impl Collocation {
    pub fn new(src: PathBuf, dst: PathBuf, k: usize) -> Self {
        Self { src, dst, k }
    }

    fn artifact(&self, suffix: &str) -> PathBuf {
        self.dst.join(format!("{}_hashtag_{}", self.k, suffix))
    }
}

impl Pipeline<()> for Collocation {
    fn run(&self) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dst)?;
        let inventory = store::inventory(&self.src)?;

        let progress = Progress::new();
        let total = inventory.pairs.len();
        progress.report("", "", &format!("{} file pair(s) to be processed.", total));

        let mut accumulator = Accumulator::new(self.k);
        let mut failed = 0usize;
        for (i, shard) in inventory.pairs.iter().enumerate() {
            progress.report(
                &i.to_string(),
                &shard.date_key,
                &format!("Now loading file: {:?}", shard.cache_path),
            );
            // a whole-shard load failure costs that shard, never the pass
            let rows = match read_cache_shard(&shard.cache_path) {
                Ok(rows) => rows,
                Err(e) => {
                    error!("shard {}: failed to load: {:?}", shard.date_key, e);
                    progress.report(&i.to_string(), &shard.date_key, "Shard failed, moving on.");
                    failed += 1;
                    continue;
                }
            };
            let before = rows.len();
            for row in &rows {
                accumulator.record(row);
            }
            progress.report(
                &i.to_string(),
                &shard.date_key,
                &format!(
                    "Read {} entr(ies); {} distinct collocation(s) so far",
                    before,
                    accumulator.distinct_collocations()
                ),
            );
        }

        info!(
            "aggregation done: {} distinct collocation(s) at k={}, {} shard(s) failed",
            accumulator.distinct_collocations(),
            self.k,
            failed
        );

        let graph = accumulator.finalize();
        graph::write_edges(&self.artifact("collocations.csv"), self.k, &graph.edges)?;
        graph::write_nodes(&self.artifact("appearances.csv"), &graph.nodes)?;
        graph.postings.save(&self.artifact("postings.bin"))?;

        progress.report(
            "",
            "",
            &format!(
                "Work finished. {} edge(s), {} node(s), {} indexed hashtag(s).",
                graph.edges.len(),
                graph.nodes.len(),
                graph.postings.len()
            ),
        );
        Ok(())
    }
}
