//! `yt-dlp` backed fetcher.
//!
//! Runs the tool once per playlist with `--dump-single-json --no-simulate`,
//! so subtitles are written to disk and the resolved playlist document is
//! printed on stdout in one pass.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::classify::{classify_message, tail_lines};
use super::{FetchError, FetchOptions, PlaylistInfo, SubtitleFetcher, UNKNOWN_PLAYLIST};

/// Lines of stderr kept in error messages.
const STDERR_TAIL: usize = 5;

/// Drives the external `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    bin: String,
}

impl YtDlpFetcher {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl SubtitleFetcher for YtDlpFetcher {
    fn fetch(&mut self, url: &str, options: &FetchOptions) -> Result<PlaylistInfo, FetchError> {
        let args = build_args(url, options);
        tracing::debug!(bin = %self.bin, ?args, "invoking fetch tool");

        let output = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FetchError::other(format!("failed to start {}: {e}", self.bin)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // With --ignore-errors a playlist that had failing items exits non-zero
        // but still prints its document; that counts as a (partial) success.
        if let Some(info) = parse_playlist_info(&stdout) {
            if !output.status.success() {
                tracing::warn!(
                    url,
                    status = ?output.status.code(),
                    stderr = %tail_lines(&stderr, STDERR_TAIL),
                    "fetch tool reported per-item errors; keeping partial results"
                );
            }
            return Ok(info);
        }

        let message = match tail_lines(&stderr, STDERR_TAIL) {
            s if s.is_empty() => format!("{} exited with {}", self.bin, output.status),
            s => s,
        };
        Err(FetchError::new(classify_message(&stderr), message))
    }
}

/// Command-line arguments for one playlist fetch.
pub fn build_args(url: &str, opts: &FetchOptions) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    if opts.skip_download {
        args.push("--skip-download".into());
    }
    args.extend([
        "--write-subs".into(),
        "--write-auto-subs".into(),
        "--sub-langs".into(),
        opts.languages.join(","),
        "--sub-format".into(),
        opts.subtitle_ext.clone(),
        "-o".into(),
        opts.output_template(),
        "--download-archive".into(),
        opts.archive.to_string_lossy().into_owned(),
        "--limit-rate".into(),
        opts.rate_limit_bytes_per_sec.to_string(),
        "--retries".into(),
        opts.network_retries.to_string(),
        "--fragment-retries".into(),
        opts.fragment_retries.to_string(),
    ]);
    args.push(if opts.expand_playlist { "--yes-playlist" } else { "--no-playlist" }.into());
    if opts.ignore_errors {
        args.push("--ignore-errors".into());
    }
    if let Some(cookies) = &opts.cookies {
        args.push("--cookies".into());
        args.push(cookies.to_string_lossy().into_owned());
    }
    args.push("--no-simulate".into());
    args.push("--dump-single-json".into());
    args.push("--".into());
    args.push(url.to_string());
    args
}

#[derive(Debug, Deserialize)]
struct PlaylistDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

/// Parse the single-JSON playlist document from tool stdout.
///
/// Returns `None` when stdout holds no JSON object (the run failed outright).
pub fn parse_playlist_info(stdout: &str) -> Option<PlaylistInfo> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('{'))
        .last()?;
    let doc: PlaylistDoc = serde_json::from_str(line).ok()?;
    let title = doc
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_PLAYLIST.to_string());
    let entries = doc.entries.iter().filter(|e| !e.is_null()).count();
    let directory = doc
        .entries
        .iter()
        .find_map(first_subtitle_path)
        .and_then(|p| p.parent().map(Path::to_path_buf));
    Some(PlaylistInfo {
        title,
        entries,
        directory,
    })
}

/// Where the tool actually wrote an entry's first subtitle, if it did.
fn first_subtitle_path(entry: &serde_json::Value) -> Option<PathBuf> {
    entry
        .get("requested_subtitles")?
        .as_object()?
        .values()
        .find_map(|sub| sub.get("filepath")?.as_str())
        .map(PathBuf::from)
}
