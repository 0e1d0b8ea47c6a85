//! `subharvest config` – show where settings live and what they resolve to.

use anyhow::Result;
use subharvest_core::config::{self, HarvestConfig};

pub fn run_config(cfg: &HarvestConfig) -> Result<()> {
    println!("Config file: {}", config::config_path()?.display());
    println!("Output root: {}", cfg.output_root.display());
    println!("Master dataset: {}", cfg.master_path().display());
    match cfg.cookies_if_present() {
        Some(p) => println!("Cookies: {}", p.display()),
        None => println!("Cookies: none"),
    }
    println!("Languages: {}", cfg.languages.join(", "));
    println!(
        "Retry: {} attempts, backoff {}-{}s",
        cfg.retry.max_attempts, cfg.retry.backoff_min_secs, cfg.retry.backoff_max_secs
    );
    println!("Pacing: {}-{}s", cfg.pacing.min_secs, cfg.pacing.max_secs);
    println!("Playlists: {}", cfg.playlists.len());
    for p in &cfg.playlists {
        println!("  {p}");
    }
    Ok(())
}
