use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;

use macaw::error::Error;
use macaw::index::Postings;
use macaw::nlp::{ScoreService, SentimentLexicon, Tokenizer, ToxicityModel};
use macaw::pipelines::scoring::{Outcome, ScoringContext, ShardWorker};
use macaw::pipelines::{Pipeline, Scoring};
use macaw::processing::resume::{load_manifest, ShardStatus};
use macaw::progress::Progress;
use macaw::shard::Shard;

fn write_gz(path: &Path, lines: &[String]) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    for line in lines {
        writeln!(enc, "{}", line).unwrap();
    }
    enc.finish().unwrap();
}

fn raw_line(id: i64, text: &str) -> String {
    format!(r#"{{"id_str":"{}","text":"{}"}}"#, id, text)
}

fn cache_line(id: i64, timestamp: &str, quoted: i64, hashtags: &[&str], botscore: f64) -> String {
    let tags: Vec<String> = hashtags.iter().map(|t| format!("\"{}\"", t)).collect();
    format!(
        r#"{{"id":{},"timestamp_ms":"{}","quoted_id":{},"hashtags":[{}],"botscore":{}}}"#,
        id,
        timestamp,
        quoted,
        tags.join(","),
        botscore
    )
}

/// Corpus with two shard pairs plus every sidecar input the scoring
/// pipeline needs. Target community: class 7 = "lula" = posts 1 and 2.
struct Fixture {
    src: tempfile::TempDir,
    dst: tempfile::TempDir,
    inputs: tempfile::TempDir,
}

impl Fixture {
    fn build() -> Self {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();

        write_gz(
            &src.path().join("tweets-20220101.json.gz"),
            &[
                raw_line(1, "bom dia #lula"),
                raw_line(2, "idiota #lula"),
                // not in the target set, must not appear in the output
                raw_line(3, "bom bom #futebol"),
            ],
        );
        write_gz(
            &src.path().join("tweets-20220101.cache.gz"),
            &[
                cache_line(1, "100", 7, &["lula"], 0.5),
                cache_line(2, "200", 8, &["lula"], 0.9),
                cache_line(3, "300", 9, &["futebol"], 0.1),
            ],
        );

        // second day has no target hits at all
        write_gz(
            &src.path().join("tweets-20220102.json.gz"),
            &[raw_line(10, "so futebol hoje #futebol")],
        );
        write_gz(
            &src.path().join("tweets-20220102.cache.gz"),
            &[cache_line(10, "400", 11, &["futebol"], 0.2)],
        );

        let mut postings = Postings::new();
        postings.insert("lula", 1);
        postings.insert("lula", 2);
        // target ids may reference posts absent from every shard
        postings.insert("lula", 999_999);
        postings.insert("futebol", 3);
        postings.insert("futebol", 10);
        postings.save(&inputs.path().join("postings.bin")).unwrap();

        let mut f = File::create(inputs.path().join("modularities.csv")).unwrap();
        writeln!(f, "Label Appearances Modularity").unwrap();
        writeln!(f, "lula 1200 7").unwrap();
        writeln!(f, "futebol 9000 3").unwrap();

        let mut f = File::create(inputs.path().join("sentilex.txt")).unwrap();
        writeln!(f, "word|PoS|POL:N0|POL:N1").unwrap();
        writeln!(f, "bom|Adj|1|1").unwrap();
        writeln!(f, "idiota|Adj|-1|-1").unwrap();

        let mut f = File::create(inputs.path().join("toxic.txt")).unwrap();
        writeln!(f, "idiota").unwrap();

        Fixture { src, dst, inputs }
    }

    fn pipeline(&self) -> Scoring {
        Scoring::new(
            self.src.path().to_path_buf(),
            self.dst.path().to_path_buf(),
            self.inputs.path().join("postings.bin"),
            self.inputs.path().join("modularities.csv"),
            self.inputs.path().join("sentilex.txt"),
            self.inputs.path().join("toxic.txt"),
            None,
            vec![7],
            2,
            false,
            None,
        )
    }
}

#[test_log::test]
fn scores_target_posts_and_skips_empty_days() {
    let fixture = Fixture::build();
    let summary = fixture.pipeline().run().unwrap();

    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped_empty, 1);
    assert_eq!(summary.posts_scored, 2);

    let scored =
        std::fs::read_to_string(fixture.dst.path().join("scored-20220101.csv")).unwrap();
    let lines: Vec<&str> = scored.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id timestamp quoted_id hashtags botscore sentiment toxicity",
            "1 100 7 lula 0.5 2 0",
            "2 200 8 lula 0.9 -2 1",
        ]
    );

    // the empty day produced no artifact but is completed in the manifest
    assert!(!fixture.dst.path().join("scored-20220102.csv").exists());
    let manifest = load_manifest(fixture.dst.path()).unwrap();
    assert_eq!(manifest["20220101"], ShardStatus::Done);
    assert_eq!(manifest["20220102"], ShardStatus::Empty);
}

#[test_log::test]
fn resumed_run_dispatches_only_remaining_shards() {
    let fixture = Fixture::build();
    let first = fixture.pipeline().run().unwrap();
    assert_eq!(first.dispatched, 2);

    // both date keys are completed now; nothing may be reprocessed
    let second = fixture.pipeline().run().unwrap();
    assert_eq!(second.dispatched, 0);
    assert_eq!(second.posts_scored, 0);

    // a new day appears: exactly that one is dispatched
    write_gz(
        &fixture.src.path().join("tweets-20220103.json.gz"),
        &[raw_line(1, "de novo #lula")],
    );
    write_gz(
        &fixture.src.path().join("tweets-20220103.cache.gz"),
        &[cache_line(1, "500", 12, &["lula"], 0.3)],
    );
    let third = fixture.pipeline().run().unwrap();
    assert_eq!(third.dispatched, 1);
    assert_eq!(third.succeeded, 1);
}

#[test]
fn oversize_shard_is_flagged_not_scored() {
    let fixture = Fixture::build();
    let pipeline = Scoring::new(
        fixture.src.path().to_path_buf(),
        fixture.dst.path().to_path_buf(),
        fixture.inputs.path().join("postings.bin"),
        fixture.inputs.path().join("modularities.csv"),
        fixture.inputs.path().join("sentilex.txt"),
        fixture.inputs.path().join("toxic.txt"),
        None,
        vec![7],
        2,
        false,
        Some(1),
    );
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.skipped_oversize, 1);
    assert_eq!(summary.succeeded, 0);
    assert!(!fixture.dst.path().join("scored-20220101.csv").exists());
    let manifest = load_manifest(fixture.dst.path()).unwrap();
    assert_eq!(manifest["20220101"], ShardStatus::Oversize);
}

struct ExplodingModel;
impl ToxicityModel for ExplodingModel {
    fn predict(&self, _text: &str) -> Result<f32, Error> {
        Err(Error::Custom("classifier blew up".to_string()))
    }
}

#[test]
fn classifier_failure_yields_neutral_score_not_shard_abort() {
    let fixture = Fixture::build();
    let (service, scorer) =
        ScoreService::spawn(Box::new(ExplodingModel), Duration::from_secs(5));

    let ctx = ScoringContext {
        target: HashSet::from([1, 2]),
        tokenizer: Tokenizer::new(),
        lexicon: SentimentLexicon::from_path(&fixture.inputs.path().join("sentilex.txt"))
            .unwrap(),
        scorer,
        dst: fixture.dst.path().to_path_buf(),
        oversize_limit: 50_000,
    };
    let shard = Shard {
        date_key: "20220101".to_string(),
        raw_path: fixture.src.path().join("tweets-20220101.json.gz"),
        cache_path: fixture.src.path().join("tweets-20220101.cache.gz"),
    };

    let outcome = ShardWorker::new(&shard, &ctx).run("0", &Progress::new());
    assert_eq!(outcome, Outcome::Success { posts: 2 });

    let scored =
        std::fs::read_to_string(fixture.dst.path().join("scored-20220101.csv")).unwrap();
    // every row still present, toxicity neutral
    assert!(scored.contains("1 100 7 lula 0.5 2 0"));
    assert!(scored.contains("2 200 8 lula 0.9 -2 0"));

    drop(ctx);
    service.join().unwrap();
}

#[test]
fn unreadable_raw_shard_is_failed_without_partial_output() {
    let fixture = Fixture::build();
    let (service, scorer) = ScoreService::spawn(
        Box::new(macaw::nlp::KeywordModel::default()),
        Duration::from_secs(5),
    );

    let ctx = ScoringContext {
        target: HashSet::from([1]),
        tokenizer: Tokenizer::new(),
        lexicon: SentimentLexicon::default(),
        scorer,
        dst: fixture.dst.path().to_path_buf(),
        oversize_limit: 50_000,
    };
    let shard = Shard {
        date_key: "20220104".to_string(),
        raw_path: fixture.src.path().join("does-not-exist-20220104.json.gz"),
        cache_path: fixture.src.path().join("tweets-20220101.cache.gz"),
    };

    let outcome = ShardWorker::new(&shard, &ctx).run("0", &Progress::new());
    assert_eq!(outcome, Outcome::Failed);
    assert!(!fixture.dst.path().join("scored-20220104.csv").exists());
    assert!(!fixture.dst.path().join("scored-20220104.csv.tmp").exists());

    drop(ctx);
    service.join().unwrap();
}

#[test]
fn invalid_source_directory_aborts_before_work() {
    let fixture = Fixture::build();
    let pipeline = Scoring::new(
        fixture.src.path().join("missing-subdir"),
        fixture.dst.path().to_path_buf(),
        fixture.inputs.path().join("postings.bin"),
        fixture.inputs.path().join("modularities.csv"),
        fixture.inputs.path().join("sentilex.txt"),
        fixture.inputs.path().join("toxic.txt"),
        None,
        vec![7],
        2,
        false,
        None,
    );
    assert!(matches!(pipeline.run(), Err(Error::InvalidPath(_))));
}
