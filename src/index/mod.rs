/*! Interest index.

The collocation pass records, for every hashtag, the set of post ids that
used it. Combined with the modularity table (community class per hashtag)
this selects the posts a scoring run cares about: the target id set.
!*/
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod modularity;

pub use modularity::ModularityTable;

/// Hashtag → post ids, persisted as a bincode artifact between the
/// collocation and scoring passes.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Postings(HashMap<String, HashSet<i64>>);

impl Postings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hashtag: &str, id: i64) {
        self.0.entry(hashtag.to_string()).or_default().insert(id);
    }

    pub fn get(&self, hashtag: &str) -> Option<&HashSet<i64>> {
        self.0.get(hashtag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut reader = BufReader::new(File::open(path)?);
        let postings =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;
        Ok(postings)
    }
}

/// Union of the posting sets of every hashtag belonging to one of the
/// selected modularity classes. Deterministic and order-independent given
/// identical inputs.
pub fn target_id_set(postings: &Postings, table: &ModularityTable, classes: &[i32]) -> HashSet<i64> {
    let wanted = table.hashtags_in_classes(classes);
    let mut target = HashSet::new();
    for hashtag in &wanted {
        if let Some(ids) = postings.get(hashtag) {
            target.extend(ids.iter().copied());
        }
    }
    info!(
        "target id set: {} post(s) across {} hashtag(s) in classes {:?}",
        target.len(),
        wanted.len(),
        classes
    );
    target
}
