//! `subharvest run` – fetch, harvest and merge every playlist in turn.

use anyhow::{bail, Result};
use subharvest_core::config::HarvestConfig;
use subharvest_core::coordinator::RunCoordinator;
use subharvest_core::dataset::XlsxStore;
use subharvest_core::fetch::YtDlpFetcher;
use subharvest_core::playlist::PlaylistTarget;

pub fn run_playlists(cfg: HarvestConfig, overrides: &[String]) -> Result<()> {
    let urls = if overrides.is_empty() {
        cfg.playlists.clone()
    } else {
        overrides.to_vec()
    };
    if urls.is_empty() {
        bail!("no playlists given; pass --playlist or list them in the config file");
    }
    let targets: Vec<PlaylistTarget> = urls.into_iter().map(PlaylistTarget::new).collect();

    let fetcher = YtDlpFetcher::new(cfg.ytdlp_bin.clone());
    let store = XlsxStore::new(cfg.languages.clone());
    let mut coordinator = RunCoordinator::new(cfg, fetcher, store);

    let summary = coordinator.run(&targets)?;
    for name in &summary.succeeded {
        println!("Processed playlist: {name}");
    }
    for url in &summary.failed {
        println!("Failed to download subtitles for playlist: {url}");
    }
    println!("{summary}");
    Ok(())
}
