//! Subtitle records, the master dataset and its merge rule.
//!
//! The master dataset is unique by `(playlist_name, video_name)`. Merging
//! appends fresh records and keeps the last occurrence of every key, so a
//! re-harvested video replaces its stale entry. The same video in two
//! playlists stays two records.

mod record;
mod store;
mod summary;

pub use record::{RecordKey, SubtitleRecord};
pub use store::{temp_path, StoreError, TableStore, XlsxStore, XLSX_MAX_CELL_CHARS};
pub use summary::Summary;

use std::collections::HashMap;

/// Ordered collection of records, unique by identity key.
///
/// Order is kept stable for readable output but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterDataset {
    records: Vec<SubtitleRecord>,
}

impl MasterDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from possibly duplicated rows, keeping the last row per key.
    pub fn from_records(records: Vec<SubtitleRecord>) -> Self {
        Self {
            records: dedup_keep_last(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SubtitleRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SubtitleRecord> {
        self.records
    }

    pub fn get(&self, playlist_name: &str, video_name: &str) -> Option<&SubtitleRecord> {
        self.records
            .iter()
            .find(|r| r.key_ref() == (playlist_name, video_name))
    }

    /// Number of records with a non-null text for `lang`.
    pub fn language_count(&self, lang: &str) -> usize {
        self.records.iter().filter(|r| r.has(lang)).count()
    }

    /// Folds `fresh` into this dataset; fresh records win on key collisions.
    pub fn merge_in(&mut self, fresh: impl IntoIterator<Item = SubtitleRecord>) {
        let mut combined = std::mem::take(&mut self.records);
        combined.extend(fresh);
        self.records = dedup_keep_last(combined);
    }
}

/// Concatenates `fresh` onto `master` and de-duplicates by identity key,
/// keeping the last occurrence of each key.
pub fn merge(mut master: MasterDataset, fresh: Vec<SubtitleRecord>) -> MasterDataset {
    master.merge_in(fresh);
    master
}

fn dedup_keep_last(records: Vec<SubtitleRecord>) -> Vec<SubtitleRecord> {
    let mut last: HashMap<RecordKey, usize> = HashMap::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        last.insert(r.key(), i);
    }
    records
        .into_iter()
        .enumerate()
        .filter(|(i, r)| last.get(&r.key()) == Some(i))
        .map(|(_, r)| r)
        .collect()
}
