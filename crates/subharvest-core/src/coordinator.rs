//! Run coordination: every playlist in turn, fetch → harvest → merge → persist.
//!
//! A playlist that cannot be fetched is logged and skipped. Only failures to
//! load or persist datasets end the run.

use rand::Rng;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::HarvestConfig;
use crate::dataset::{MasterDataset, StoreError, Summary, TableStore};
use crate::fetch::{SubtitleFetcher, UNKNOWN_PLAYLIST};
use crate::harvest::Harvester;
use crate::orchestrator::FetchOrchestrator;
use crate::playlist::{sanitize_path_component, PlaylistTarget};
use crate::retry::{Pacer, Sleeper};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("load master dataset {path}: {source}")]
    LoadMaster {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("persist dataset {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

/// Result of folding one playlist directory into the master dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMerge {
    /// Records harvested from the playlist directory.
    pub harvested: usize,
    /// Per-playlist dataset file written; `None` when the directory was
    /// missing and the existing datasets were left untouched.
    pub dataset: Option<PathBuf>,
}

/// Sequential driver over a list of playlist targets.
pub struct RunCoordinator<F, T, S = crate::retry::ThreadSleeper, R = rand::rngs::StdRng> {
    orchestrator: FetchOrchestrator<F, S, R>,
    harvester: Harvester,
    store: T,
}

impl<F: SubtitleFetcher, T: TableStore> RunCoordinator<F, T> {
    pub fn new(config: HarvestConfig, fetcher: F, store: T) -> Self {
        Self::with_pacer(config, fetcher, store, Pacer::new())
    }
}

impl<F, T, S, R> RunCoordinator<F, T, S, R>
where
    F: SubtitleFetcher,
    T: TableStore,
    S: Sleeper,
    R: Rng,
{
    pub fn with_pacer(config: HarvestConfig, fetcher: F, store: T, pacer: Pacer<S, R>) -> Self {
        let harvester = Harvester::new(config.languages.clone(), config.subtitle_ext.clone());
        Self {
            orchestrator: FetchOrchestrator::with_pacer(config, fetcher, pacer),
            harvester,
            store,
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        self.orchestrator.config()
    }

    pub fn orchestrator_mut(&mut self) -> &mut FetchOrchestrator<F, S, R> {
        &mut self.orchestrator
    }

    /// Loads the persisted master dataset, or an empty one if none exists.
    pub fn load_master(&self) -> Result<MasterDataset, RunError> {
        let path = self.config().master_path();
        match self.store.load(&path) {
            Ok(Some(records)) => {
                let master = MasterDataset::from_records(records);
                tracing::info!(
                    path = %path.display(),
                    records = master.len(),
                    "loaded master dataset"
                );
                Ok(master)
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "no master dataset yet; starting empty");
                Ok(MasterDataset::new())
            }
            Err(source) => Err(RunError::LoadMaster { path, source }),
        }
    }

    /// Processes every target in order and reports over the final master dataset.
    pub fn run(&mut self, targets: &[PlaylistTarget]) -> Result<Summary, RunError> {
        let mut master = self.load_master()?;
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for (i, target) in targets.iter().enumerate() {
            tracing::info!(
                playlist = %target.url,
                index = i + 1,
                total = targets.len(),
                "processing playlist"
            );
            match self.orchestrator.acquire(target) {
                Ok(acquired) => {
                    let merged =
                        self.merge_directory(&mut master, &acquired.name, &acquired.directory)?;
                    tracing::info!(
                        playlist = %acquired.name,
                        harvested = merged.harvested,
                        master = master.len(),
                        "subtitles saved; master dataset updated"
                    );
                    succeeded.push(acquired.name);
                }
                Err(e) => {
                    tracing::warn!(
                        playlist = %target.url,
                        error = %e,
                        "failed to download subtitles"
                    );
                    failed.push(target.url.clone());
                }
            }

            if i + 1 < targets.len() {
                let (lo, hi) = self.config().pacing_bounds();
                let slept = self.orchestrator.pacer_mut().pause_between(lo, hi);
                tracing::debug!(secs = slept.as_secs_f64(), "paused before next playlist");
            }
        }

        let mut summary = Summary::from_dataset(&master, &self.config().languages);
        summary.succeeded = succeeded;
        summary.failed = failed;
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "run complete"
        );
        Ok(summary)
    }

    /// Harvests `directory`, writes the per-playlist dataset, merges into
    /// `master` and persists the master dataset. A missing directory is
    /// logged and leaves both datasets untouched.
    pub fn merge_directory(
        &self,
        master: &mut MasterDataset,
        name: &str,
        directory: &std::path::Path,
    ) -> Result<PlaylistMerge, RunError> {
        if !directory.is_dir() {
            tracing::warn!(
                playlist = %name,
                dir = %directory.display(),
                "playlist directory not found; keeping existing datasets"
            );
            return Ok(PlaylistMerge {
                harvested: 0,
                dataset: None,
            });
        }
        let fresh = self.harvester.harvest(directory);

        let dataset = self.playlist_dataset_path(name);
        self.store
            .save(&fresh, &dataset)
            .map_err(|source| RunError::Persist {
                path: dataset.clone(),
                source,
            })?;

        let harvested = fresh.len();
        master.merge_in(fresh);

        let master_path = self.config().master_path();
        self.store
            .save(master.records(), &master_path)
            .map_err(|source| RunError::Persist {
                path: master_path.clone(),
                source,
            })?;
        tracing::debug!(
            path = %master_path.display(),
            records = master.len(),
            "master dataset persisted"
        );

        Ok(PlaylistMerge {
            harvested,
            dataset: Some(dataset),
        })
    }

    /// `{root}/{playlist_title}.xlsx`, with the title made path-safe.
    pub fn playlist_dataset_path(&self, name: &str) -> PathBuf {
        let mut stem = sanitize_path_component(name);
        if stem.is_empty() {
            stem = UNKNOWN_PLAYLIST.to_string();
        }
        self.config().output_root.join(format!("{stem}.xlsx"))
    }
}
