use std::fmt;

use super::MasterDataset;

/// Aggregate report over the final master dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records in the master dataset.
    pub total: usize,
    /// Non-null counts per language, in configured order.
    pub per_language: Vec<(String, usize)>,
    /// Names of playlists merged during the run.
    pub succeeded: Vec<String>,
    /// Targets (as given) that could not be fetched.
    pub failed: Vec<String>,
}

impl Summary {
    pub fn from_dataset(dataset: &MasterDataset, languages: &[String]) -> Self {
        Self {
            total: dataset.len(),
            per_language: languages
                .iter()
                .map(|l| (l.clone(), dataset.language_count(l)))
                .collect(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn count(&self, lang: &str) -> Option<usize> {
        self.per_language
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, n)| *n)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Summary:")?;
        if !self.succeeded.is_empty() || !self.failed.is_empty() {
            writeln!(
                f,
                "Playlists: {} succeeded, {} failed",
                self.succeeded.len(),
                self.failed.len()
            )?;
        }
        write!(f, "Total videos processed: {}", self.total)?;
        for (lang, n) in &self.per_language {
            write!(f, "\n{lang} subtitles available: {n}")?;
        }
        Ok(())
    }
}
