use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Playlist-level retry parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of playlist-level fetch invocations (including the first).
    pub max_attempts: u32,
    /// Per-item network retries handed to the fetch tool.
    pub network_retries: u32,
    /// Per-fragment retries handed to the fetch tool.
    pub fragment_retries: u32,
    /// Lower bound of the random rate-limit backoff factor, in seconds.
    pub backoff_min_secs: f64,
    /// Upper bound of the random rate-limit backoff factor, in seconds.
    pub backoff_max_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            network_retries: 3,
            fragment_retries: 3,
            backoff_min_secs: 1.0,
            backoff_max_secs: 10.0,
        }
    }
}

/// Randomized pause between playlists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 5.0,
        }
    }
}

/// Global configuration loaded from `~/.config/subharvest/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Root directory for archives, subtitle artifacts and datasets.
    pub output_root: PathBuf,
    /// Master dataset file name, relative to `output_root`.
    pub master_file: String,
    /// Optional cookies file; only passed to the fetch tool when it exists.
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,
    /// Subtitle language variants, in dataset column order.
    pub languages: Vec<String>,
    /// Subtitle artifact extension (without the dot).
    pub subtitle_ext: String,
    /// Fetch tool executable.
    pub ytdlp_bin: String,
    /// Speed cap handed to the fetch tool, in bytes per second.
    pub rate_limit_bytes_per_sec: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Playlist URLs (or bare ids) processed by `subharvest run`.
    #[serde(default)]
    pub playlists: Vec<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("subtitles"),
            master_file: "all_playlists_subtitles.xlsx".to_string(),
            cookies_file: Some(PathBuf::from("cookies.txt")),
            languages: vec!["en".to_string(), "ur".to_string(), "auto".to_string()],
            subtitle_ext: "vtt".to_string(),
            ytdlp_bin: "yt-dlp".to_string(),
            rate_limit_bytes_per_sec: 1_000_000,
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            playlists: vec![
                "https://www.youtube.com/watch?v=8kPif5oSbw4&list=PLdZNFVCDo_1emqBpUQxOXU-fGZG3nVJKM".to_string(),
                "https://www.youtube.com/watch?v=4L2V7KueDBs&list=PLb2aaNHUy_gEldBBBffyW-4Y56UtPon8C".to_string(),
                "https://www.youtube.com/watch?v=XEPc2bUpC-c&list=PLb2aaNHUy_gEHFn5X2HQ7uIAkhqhqRcHI".to_string(),
            ],
        }
    }
}

impl HarvestConfig {
    /// Path of the master dataset.
    pub fn master_path(&self) -> PathBuf {
        self.output_root.join(&self.master_file)
    }

    /// Cookies file, if configured and present on disk.
    pub fn cookies_if_present(&self) -> Option<&Path> {
        self.cookies_file
            .as_deref()
            .filter(|p| p.exists())
    }

    pub fn pacing_bounds(&self) -> (Duration, Duration) {
        secs_range(self.pacing.min_secs, self.pacing.max_secs)
    }

    /// Rejects second bounds that cannot become durations (`inf`, `nan`).
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("retry.backoff_min_secs", self.retry.backoff_min_secs),
            ("retry.backoff_max_secs", self.retry.backoff_max_secs),
            ("pacing.min_secs", self.pacing.min_secs),
            ("pacing.max_secs", self.pacing.max_secs),
        ];
        for (key, value) in bounds {
            anyhow::ensure!(
                value.is_finite(),
                "{key} must be a finite number of seconds, got {value}"
            );
        }
        Ok(())
    }
}

/// Converts a pair of second bounds into durations, clamping negatives and
/// swapping a reversed pair.
pub(crate) fn secs_range(a: f64, b: f64) -> (Duration, Duration) {
    let secs = |v: f64| {
        if v.is_finite() {
            Duration::from_secs_f64(v.max(0.0))
        } else {
            Duration::ZERO
        }
    };
    let lo = secs(a);
    let hi = secs(b);
    if lo <= hi {
        (lo, hi)
    } else {
        (hi, lo)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("subharvest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HarvestConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<HarvestConfig> {
    if !path.exists() {
        let default_cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: HarvestConfig = toml::from_str(&data)?;
    cfg.validate()
        .map_err(|e| e.context(format!("invalid config {}", path.display())))?;
    Ok(cfg)
}
