//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "macaw", about = "hashtag corpus pipeline.")]
/// Holds every command callable by the `macaw` binary.
pub enum Macaw {
    #[structopt(about = "Derive cache shards from raw archives")]
    Convert(Convert),
    #[structopt(about = "Build the hashtag collocation graph and postings index")]
    Collocate(Collocate),
    #[structopt(about = "Score target posts (sentiment + toxicity) per shard")]
    Score(Score),
    #[structopt(about = "Filter graph nodes/edges below a weight cutoff")]
    Prune(Prune),
}

#[derive(Debug, StructOpt)]
pub struct Convert {
    #[structopt(parse(from_os_str), help = "directory of raw *.json.gz shards")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "cache shard destination")]
    pub dst: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Collocate {
    #[structopt(parse(from_os_str), help = "directory of paired shards")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "artifact destination")]
    pub dst: PathBuf,
    #[structopt(
        short = "k",
        long = "combination-size",
        help = "hashtags per collocation",
        default_value = "2"
    )]
    pub combination_size: usize,
}

#[derive(Debug, StructOpt)]
/// Score command and parameters.
pub struct Score {
    #[structopt(parse(from_os_str), help = "directory of paired shards")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "scored artifact destination")]
    pub dst: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "index",
        help = "postings index from the collocate pass"
    )]
    pub index: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "modularity",
        help = "modularity node table (Label Appearances Modularity)"
    )]
    pub modularity: PathBuf,
    #[structopt(parse(from_os_str), long = "lexicon", help = "sentiment lexicon file")]
    pub lexicon: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "toxic-terms",
        help = "toxicity term list"
    )]
    pub toxic_terms: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "stopwords",
        help = "stopword list, one word per line"
    )]
    pub stopwords: Option<PathBuf>,
    #[structopt(
        short = "c",
        long = "classes",
        help = "modularity classes to score",
        required = true,
        min_values = 1
    )]
    pub classes: Vec<i32>,
    #[structopt(
        short = "j",
        long = "workers",
        help = "number of worker threads",
        default_value = "3"
    )]
    pub workers: usize,
    #[structopt(
        long = "shuffle",
        help = "shuffle the work list (soft collision avoidance between runs)"
    )]
    pub shuffle: bool,
    #[structopt(
        long = "oversize-limit",
        help = "skip shards with more filtered posts than this"
    )]
    pub oversize_limit: Option<usize>,
}

#[derive(Debug, StructOpt)]
pub struct Prune {
    #[structopt(parse(from_os_str), help = "node table (Label Appearances)")]
    pub nodes: PathBuf,
    #[structopt(parse(from_os_str), help = "edge table (Source Target Weight)")]
    pub edges: PathBuf,
    #[structopt(parse(from_os_str), help = "destination directory")]
    pub dst: PathBuf,
    #[structopt(
        long = "cutoff",
        help = "keep items with weight strictly above this",
        default_value = "1000"
    )]
    pub cutoff: u64,
}
