//! Fetch capability: downloads a playlist's subtitle artifacts to disk.
//!
//! The orchestrator only sees the [`SubtitleFetcher`] trait; the shipped
//! implementation drives the external `yt-dlp` tool.

mod classify;
mod error;
mod ytdlp;

pub use classify::{classify_message, tail_lines};
pub use error::FetchError;
pub use ytdlp::{build_args, parse_playlist_info, YtDlpFetcher};

use std::path::{Path, PathBuf};

use crate::config::HarvestConfig;

/// Title reported when the tool does not name the playlist.
pub const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";

/// Options handed to the fetch capability for one playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Root under which `{playlist_title}/{video_title}.{lang}.{ext}` is written.
    pub output_root: PathBuf,
    /// Append-only archive of already-fetched video ids.
    pub archive: PathBuf,
    /// Subtitle languages to request.
    pub languages: Vec<String>,
    /// Subtitle format / artifact extension.
    pub subtitle_ext: String,
    /// Subtitles only; never download media.
    pub skip_download: bool,
    /// Expand playlist URLs into their entries.
    pub expand_playlist: bool,
    /// Continue past per-item failures instead of aborting the playlist.
    pub ignore_errors: bool,
    pub network_retries: u32,
    pub fragment_retries: u32,
    /// Speed cap in bytes per second.
    pub rate_limit_bytes_per_sec: u64,
    /// Credential file, only set when it exists on disk.
    pub cookies: Option<PathBuf>,
}

impl FetchOptions {
    /// Options for one playlist, derived from the run configuration.
    pub fn from_config(cfg: &HarvestConfig, archive: &Path) -> Self {
        Self {
            output_root: cfg.output_root.clone(),
            archive: archive.to_path_buf(),
            languages: cfg.languages.clone(),
            subtitle_ext: cfg.subtitle_ext.clone(),
            skip_download: true,
            expand_playlist: true,
            ignore_errors: true,
            network_retries: cfg.retry.network_retries,
            fragment_retries: cfg.retry.fragment_retries,
            rate_limit_bytes_per_sec: cfg.rate_limit_bytes_per_sec,
            cookies: cfg.cookies_if_present().map(Path::to_path_buf),
        }
    }

    /// Output template: `{root}/%(playlist_title)s/%(title)s.%(ext)s`.
    /// The tool inserts the language before the extension for subtitles.
    pub fn output_template(&self) -> String {
        self.output_root
            .join("%(playlist_title)s")
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned()
    }
}

/// What a successful playlist fetch reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistInfo {
    /// Display title; also the name of the output directory.
    pub title: String,
    /// Number of entries the tool resolved (failed items excluded).
    pub entries: usize,
    /// Directory the tool wrote subtitles into, when it reported one.
    pub directory: Option<PathBuf>,
}

/// Fetches subtitle artifacts for one playlist URL.
pub trait SubtitleFetcher {
    fn fetch(&mut self, url: &str, options: &FetchOptions) -> Result<PlaylistInfo, FetchError>;
}

impl<T: SubtitleFetcher + ?Sized> SubtitleFetcher for &mut T {
    fn fetch(&mut self, url: &str, options: &FetchOptions) -> Result<PlaylistInfo, FetchError> {
        (**self).fetch(url, options)
    }
}

impl<T: SubtitleFetcher + ?Sized> SubtitleFetcher for Box<T> {
    fn fetch(&mut self, url: &str, options: &FetchOptions) -> Result<PlaylistInfo, FetchError> {
        (**self).fetch(url, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_default_config() {
        let mut cfg = HarvestConfig::default();
        cfg.cookies_file = Some(PathBuf::from("/definitely/not/here/cookies.txt"));
        let archive = Path::new("subtitles/downloaded_videos_PL1.txt");
        let opts = FetchOptions::from_config(&cfg, archive);
        assert!(opts.skip_download);
        assert!(opts.expand_playlist);
        assert!(opts.ignore_errors);
        assert_eq!(opts.network_retries, 3);
        assert_eq!(opts.fragment_retries, 3);
        assert_eq!(opts.languages, vec!["en", "ur", "auto"]);
        assert!(opts.cookies.is_none());
    }

    #[test]
    fn output_template_nests_playlist_title() {
        let cfg = HarvestConfig::default();
        let opts = FetchOptions::from_config(&cfg, Path::new("a.txt"));
        assert_eq!(
            opts.output_template(),
            "subtitles/%(playlist_title)s/%(title)s.%(ext)s"
        );
    }
}
