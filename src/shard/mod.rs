/*! Shard identity and pairing.

A shard is one dated unit of the corpus: a raw archive (`<stem>.json.gz`)
and its cache counterpart (`<stem>.cache.gz`), where the stem ends in a
`-<date_key>` segment (e.g. `elections2022_tweets-20221002`).
!*/
use std::path::{Path, PathBuf};

pub mod store;

/// A matched raw/cache pair, keyed by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub date_key: String,
    pub raw_path: PathBuf,
    pub cache_path: PathBuf,
}

/// Extract the date key from a shard or artifact file name: everything
/// before the first `.`, then the segment after the last `-`.
///
/// `scored-20221002.csv` and `elections2022_tweets-20221002.json.gz` both
/// yield `20221002`.
pub fn date_key(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    stem.rsplit('-').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_from_shard_name() {
        let p = Path::new("/data/elections2022_tweets-20221002.json.gz");
        assert_eq!(date_key(p), Some("20221002".to_string()));
    }

    #[test]
    fn date_key_from_artifact_name() {
        let p = Path::new("out/scored-20221002.csv");
        assert_eq!(date_key(p), Some("20221002".to_string()));
    }

    #[test]
    fn date_key_without_dash_is_whole_stem() {
        let p = Path::new("nodash.json.gz");
        assert_eq!(date_key(p), Some("nodash".to_string()));
    }
}
