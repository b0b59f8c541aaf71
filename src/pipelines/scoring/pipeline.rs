/*! Scoring pipeline.

Builds the target id set from the postings index and the modularity table,
trims the work list through the resume layer, then dispatches one shard
per task on a fixed-size rayon pool. Workers write their own artifacts;
the pool only bounds concurrency. The one toxicity model lives in the
scoring service thread, addressed over a channel, so predictions are
serialized no matter how many workers run.

Output ordering across shards is unspecified; within a shard, rows follow
the filtered post order.
!*/
use std::path::PathBuf;
use std::time::Duration;

use log::{error, info};
use rayon::prelude::*;

use crate::error::Error;
use crate::index::{self, ModularityTable, Postings};
use crate::nlp::{KeywordModel, ScoreService, SentimentLexicon, Tokenizer, ToxicityModel};
use crate::pipelines::pipeline::Pipeline;
use crate::pipelines::scoring::worker::{Outcome, ScoringContext, ShardWorker};
use crate::processing::resume::{self, ManifestWriter};
use crate::progress::Progress;
use crate::shard::store;

const DEFAULT_OVERSIZE_LIMIT: usize = 50_000;
const SCORE_REPLY_TIMEOUT: Duration = Duration::from_secs(120);

/// End-of-run totals.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub skipped_empty: usize,
    pub skipped_oversize: usize,
    pub failed: usize,
    pub posts_scored: usize,
}

impl RunSummary {
    fn add(&mut self, outcome: &Outcome) {
        self.dispatched += 1;
        match outcome {
            Outcome::Success { posts } => {
                self.succeeded += 1;
                self.posts_scored += posts;
            }
            Outcome::SkippedEmpty => self.skipped_empty += 1,
            Outcome::SkippedOversize { .. } => self.skipped_oversize += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

pub struct Scoring {
    src: PathBuf,
    dst: PathBuf,
    index: PathBuf,
    modularity: PathBuf,
    lexicon: PathBuf,
    toxic_terms: PathBuf,
    stopwords: Option<PathBuf>,
    classes: Vec<i32>,
    workers: usize,
    shuffle: bool,
    oversize_limit: usize,
}

impl Scoring {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        src: PathBuf,
        dst: PathBuf,
        index: PathBuf,
        modularity: PathBuf,
        lexicon: PathBuf,
        toxic_terms: PathBuf,
        stopwords: Option<PathBuf>,
        classes: Vec<i32>,
        workers: usize,
        shuffle: bool,
        oversize_limit: Option<usize>,
    ) -> Self {
        Self {
            src,
            dst,
            index,
            modularity,
            lexicon,
            toxic_terms,
            stopwords,
            classes,
            workers,
            shuffle,
            oversize_limit: oversize_limit.unwrap_or(DEFAULT_OVERSIZE_LIMIT),
        }
    }
}

impl Pipeline<RunSummary> for Scoring {
    fn run(&self) -> Result<RunSummary, Error> {
        std::fs::create_dir_all(&self.dst)?;

        // Inputs that must exist before any work starts; failing here is
        // operator error.
        let postings = Postings::load(&self.index)?;
        let table = ModularityTable::from_path(&self.modularity)?;
        let lexicon = SentimentLexicon::from_path(&self.lexicon)?;
        let tokenizer = match &self.stopwords {
            Some(path) => Tokenizer::with_stopwords(path)?,
            None => Tokenizer::new(),
        };
        let model: Box<dyn ToxicityModel> = Box::new(KeywordModel::from_path(&self.toxic_terms)?);

        let target = index::target_id_set(&postings, &table, &self.classes);
        info!(
            "modularity table: {} hashtag(s), {} class(es)",
            table.len(),
            table.class_count()
        );

        let inventory = store::inventory(&self.src)?;
        let work = resume::remaining(inventory.pairs, &self.dst, self.shuffle)?;

        let progress = Progress::new();
        progress.report(
            "",
            "",
            &format!("Number of shards to process: {}", work.len()),
        );
        progress.report(
            "",
            "",
            &format!("Number of posts to find: {}", target.len()),
        );

        let (service, scorer) = ScoreService::spawn(model, SCORE_REPLY_TIMEOUT);
        let manifest = ManifestWriter::open(&self.dst)?;
        let ctx = ScoringContext {
            target,
            tokenizer,
            lexicon,
            scorer,
            dst: self.dst.clone(),
            oversize_limit: self.oversize_limit,
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| Error::Custom(format!("could not build worker pool: {}", e)))?;

        let outcomes: Vec<Outcome> = pool.install(|| {
            work.par_iter()
                .map(|shard| {
                    let worker = rayon::current_thread_index()
                        .map(|i| i.to_string())
                        .unwrap_or_default();
                    let outcome = ShardWorker::new(shard, &ctx).run(&worker, &progress);
                    if let Err(e) =
                        manifest.record(&shard.date_key, outcome.status(), outcome.posts())
                    {
                        // the artifact is the source of truth, a manifest
                        // miss only costs a redundant skip check next run
                        error!("could not record {} in manifest: {:?}", shard.date_key, e);
                    }
                    outcome
                })
                .collect()
        });

        // every client clone is gone once the workers are done
        drop(ctx);
        service.join()?;

        let mut summary = RunSummary::default();
        for outcome in &outcomes {
            summary.add(outcome);
        }
        progress.report(
            "",
            "",
            &format!(
                "Run complete: {} dispatched, {} ok, {} empty, {} oversize, {} failed, {} post(s) scored",
                summary.dispatched,
                summary.succeeded,
                summary.skipped_empty,
                summary.skipped_oversize,
                summary.failed,
                summary.posts_scored
            ),
        );
        Ok(summary)
    }
}
