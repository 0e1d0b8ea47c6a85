//! `subharvest harvest <DIR>` – merge an existing playlist directory without fetching.

use anyhow::{Context, Result};
use std::path::Path;
use subharvest_core::config::HarvestConfig;
use subharvest_core::coordinator::RunCoordinator;
use subharvest_core::dataset::{Summary, XlsxStore};
use subharvest_core::fetch::YtDlpFetcher;

pub fn run_harvest(cfg: HarvestConfig, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .with_context(|| format!("cannot derive playlist name from {}", dir.display()))?;

    let languages = cfg.languages.clone();
    let fetcher = YtDlpFetcher::new(cfg.ytdlp_bin.clone());
    let store = XlsxStore::new(languages.clone());
    let coordinator = RunCoordinator::new(cfg, fetcher, store);

    let mut master = coordinator.load_master()?;
    let merged = coordinator.merge_directory(&mut master, &name, dir)?;
    if let Some(dataset) = &merged.dataset {
        println!(
            "Harvested {} videos from {} into {}",
            merged.harvested,
            name,
            dataset.display()
        );
    }
    println!("{}", Summary::from_dataset(&master, &languages));
    Ok(())
}
