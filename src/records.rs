/*! Post records.

A shard exists in two forms: the raw archive (full tweet JSON, one object
per line) and the cache shard (a light row per tweet, carrying only the
fields downstream steps need). [Post] is what the scoring pipeline reads
from the raw side, [CacheRow] is a cache shard line.

Tweet ids are `i64` everywhere. They enter as `id_str` and are parsed once
here; carrying them as anything else (notably floats) silently corrupts
identities above 2^53.
!*/
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A raw post, reduced to what scoring needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// lowercase, deduplicated
    pub hashtags: Vec<String>,
}

/// One line of a cache shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRow {
    pub id: i64,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
    #[serde(default)]
    pub quoted_id: Option<i64>,
    #[serde(default)]
    pub retweeted_id: Option<i64>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub botscore: Option<f64>,
}

/// Raw tweet JSON, limited to the fields we flatten out of it.
#[derive(Debug, Deserialize)]
struct RawTweet {
    id_str: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    timestamp_ms: Option<String>,
    #[serde(default)]
    truncated: Option<bool>,
    #[serde(default)]
    entities: Option<Entities>,
    #[serde(default)]
    extended_tweet: Option<ExtendedTweet>,
    #[serde(default)]
    retweeted_status: Option<Box<StatusRef>>,
    #[serde(default)]
    quoted_status: Option<Box<StatusRef>>,
    #[serde(default)]
    botscore: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ExtendedTweet {
    #[serde(default)]
    entities: Option<Entities>,
}

#[derive(Debug, Deserialize)]
struct StatusRef {
    #[serde(default)]
    id_str: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Entities {
    #[serde(default)]
    hashtags: Vec<HashtagEntity>,
}

#[derive(Debug, Deserialize)]
struct HashtagEntity {
    text: String,
}

impl RawTweet {
    fn id(&self) -> Result<i64, Error> {
        self.id_str
            .parse::<i64>()
            .map_err(|e| Error::Custom(format!("bad id_str {:?}: {}", self.id_str, e)))
    }

    /// Hashtags from the entity block (the extended one on truncated tweets),
    /// lowercased and deduplicated. Falls back to scanning the text for `#`
    /// tokens when no entity block is present.
    fn hashtags(&self) -> Vec<String> {
        let entities = if self.truncated.unwrap_or(false) {
            self.extended_tweet
                .as_ref()
                .and_then(|e| e.entities.as_ref())
        } else {
            self.entities.as_ref()
        };

        let mut tags: Vec<String> = match entities {
            Some(e) => e.hashtags.iter().map(|h| h.text.to_lowercase()).collect(),
            None => self
                .text
                .as_deref()
                .unwrap_or("")
                .split_whitespace()
                .filter_map(|w| w.strip_prefix('#'))
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
                .collect(),
        };

        tags.sort();
        tags.dedup();
        tags
    }
}

impl Post {
    /// Parse a single raw shard line.
    pub fn from_json_line(line: &str) -> Result<Self, Error> {
        let raw: RawTweet = serde_json::from_str(line)?;
        Ok(Post {
            id: raw.id()?,
            hashtags: raw.hashtags(),
            text: raw.text.unwrap_or_default(),
        })
    }
}

impl CacheRow {
    /// Parse a single cache shard line.
    pub fn from_json_line(line: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(line)?)
    }

    /// Flatten a raw shard line into a cache row. Used when deriving cache
    /// shards from the raw archive.
    pub fn from_raw_json_line(line: &str) -> Result<Self, Error> {
        fn ref_id(status: Option<&StatusRef>) -> Option<i64> {
            status
                .and_then(|s| s.id_str.as_deref())
                .and_then(|s| s.parse::<i64>().ok())
        }

        let raw: RawTweet = serde_json::from_str(line)?;
        Ok(CacheRow {
            id: raw.id()?,
            hashtags: raw.hashtags(),
            timestamp_ms: raw.timestamp_ms.clone(),
            retweeted_id: ref_id(raw.retweeted_status.as_deref()),
            quoted_id: ref_id(raw.quoted_status.as_deref()),
            botscore: raw.botscore,
        })
    }
}
