/*! Per-shard scoring worker.

A pure pipeline per shard: Load → Filter → Size guard → Preprocess →
Score → Merge → Emit, run to completion or failed atomically. Scores are
joined back onto cache rows by post id, never by row position.

Failure discipline:
- a malformed raw line was already dropped at read time,
- a per-post scoring failure becomes the neutral score for that post only,
- a whole-shard load error is a Failed outcome; no partial artifact is
  left behind (the writer stages to `.tmp`).
!*/
use std::collections::HashSet;
use std::path::PathBuf;

use log::{error, warn};

use crate::error::Error;
use crate::io::reader::{cache, raw};
use crate::io::writer::{ScoredRow, ScoredShardWriter};
use crate::nlp::{ScoreClient, SentimentLexicon, Tokenizer};
use crate::processing::resume::ShardStatus;
use crate::progress::Progress;
use crate::shard::Shard;

/// Terminal state of one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { posts: usize },
    SkippedEmpty,
    SkippedOversize { posts: usize },
    Failed,
}

impl Outcome {
    pub fn status(&self) -> ShardStatus {
        match self {
            Outcome::Success { .. } => ShardStatus::Done,
            Outcome::SkippedEmpty => ShardStatus::Empty,
            Outcome::SkippedOversize { .. } => ShardStatus::Oversize,
            Outcome::Failed => ShardStatus::Failed,
        }
    }

    pub fn posts(&self) -> Option<usize> {
        match self {
            Outcome::Success { posts } | Outcome::SkippedOversize { posts } => Some(*posts),
            _ => None,
        }
    }
}

/// Read-only handles shared by every worker of a run.
pub struct ScoringContext {
    pub target: HashSet<i64>,
    pub tokenizer: Tokenizer,
    pub lexicon: SentimentLexicon,
    pub scorer: ScoreClient,
    pub dst: PathBuf,
    /// Size guard: shards with more filtered posts than this are skipped
    /// and flagged for manual reprocessing.
    pub oversize_limit: usize,
}

pub struct ShardWorker<'a> {
    shard: &'a Shard,
    ctx: &'a ScoringContext,
}

impl<'a> ShardWorker<'a> {
    pub fn new(shard: &'a Shard, ctx: &'a ScoringContext) -> Self {
        Self { shard, ctx }
    }

    /// Run the shard to its terminal state. Errors never escape: a
    /// whole-shard error is logged and mapped to [Outcome::Failed] so the
    /// pool continues with the next shard.
    pub fn run(&self, worker: &str, progress: &Progress) -> Outcome {
        match self.process(worker, progress) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("shard {}: failed: {:?}", self.shard.date_key, e);
                progress.report(worker, &self.shard.date_key, "Shard failed, moving on.");
                Outcome::Failed
            }
        }
    }

    fn process(&self, worker: &str, progress: &Progress) -> Result<Outcome, Error> {
        let date = &self.shard.date_key;
        progress.report(
            worker,
            date,
            &format!("Now loading raw file: {:?}", self.shard.raw_path),
        );

        // Load raw + filter against the target set
        let posts = raw::read_raw_shard(&self.shard.raw_path)?;
        let filtered: Vec<_> = posts
            .iter()
            .filter(|p| self.ctx.target.contains(&p.id))
            .collect();

        if filtered.is_empty() {
            progress.report(
                worker,
                date,
                "0 hits in day after load. Skipping sentiment and toxicity analysis.",
            );
            return Ok(Outcome::SkippedEmpty);
        }
        progress.report(
            worker,
            date,
            &format!("{} text(s) found after filtering", filtered.len()),
        );

        // Size guard, tuned to not exhaust the scoring resource
        if filtered.len() > self.ctx.oversize_limit {
            progress.report(
                worker,
                date,
                &format!(
                    "{} posts exceed the {} limit; flagged for manual reprocessing",
                    filtered.len(),
                    self.ctx.oversize_limit
                ),
            );
            return Ok(Outcome::SkippedOversize {
                posts: filtered.len(),
            });
        }

        // Cache side, keyed by id for the merge
        let cache_rows = cache::read_cache_shard_by_id(&self.shard.cache_path)?;

        // Preprocess + score + merge, then emit
        let mut writer = ScoredShardWriter::create(&self.ctx.dst, date)?;
        let result = self.score_posts(&filtered, &cache_rows, &mut writer, worker, progress);
        match result {
            Ok(written) => {
                writer.commit()?;
                progress.report(worker, date, &format!("{} row(s) written out", written));
                Ok(Outcome::Success { posts: written })
            }
            Err(e) => {
                writer.abort();
                Err(e)
            }
        }
    }

    fn score_posts(
        &self,
        filtered: &[&crate::records::Post],
        cache_rows: &std::collections::HashMap<i64, crate::records::CacheRow>,
        writer: &mut ScoredShardWriter,
        worker: &str,
        progress: &Progress,
    ) -> Result<usize, Error> {
        let date = &self.shard.date_key;
        let mut written = 0usize;

        for post in filtered {
            let tokens = self.ctx.tokenizer.tokenize(&post.text);
            let cleaned = tokens.join(" ");

            let sentiment = self.ctx.lexicon.score(&tokens);
            // one bad post must never abort the shard
            let toxicity = match self.ctx.scorer.predict(&cleaned) {
                Ok(score) => score,
                Err(e) => {
                    warn!(
                        "shard {}: post {}: neutral toxicity fallback: {:?}",
                        date, post.id, e
                    );
                    0.0
                }
            };

            let Some(cache_row) = cache_rows.get(&post.id) else {
                warn!(
                    "shard {}: post {} has no cache row, skipping",
                    date, post.id
                );
                continue;
            };

            writer.write_row(&ScoredRow {
                id: post.id,
                timestamp: cache_row.timestamp_ms.clone(),
                quoted_id: cache_row.quoted_id,
                hashtags: cache_row.hashtags.clone(),
                botscore: cache_row.botscore,
                sentiment,
                toxicity,
            })?;
            written += 1;
        }

        progress.report(
            worker,
            date,
            "Sentiment and toxicity analysis complete",
        );
        Ok(written)
    }
}
