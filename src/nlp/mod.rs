/*! NLP collaborators.

The pipeline treats tokenisation, sentiment and toxicity as external
collaborators behind small interfaces. The implementations here are thin
and deterministic; swapping in a heavier model only means implementing
[toxicity::ToxicityModel].
!*/
pub mod sentiment;
pub mod service;
pub mod tokenize;
pub mod toxicity;

pub use sentiment::SentimentLexicon;
pub use service::{ScoreClient, ScoreService};
pub use tokenize::Tokenizer;
pub use toxicity::{KeywordModel, ToxicityModel};
