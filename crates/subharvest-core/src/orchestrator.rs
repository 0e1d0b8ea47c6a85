//! Fetch orchestration: one playlist, bounded retries, typed failure policy.

use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::archive::ArchiveRecord;
use crate::config::HarvestConfig;
use crate::fetch::{FetchError, FetchOptions, SubtitleFetcher};
use crate::playlist::PlaylistTarget;
use crate::retry::{run_with_retry, Pacer, RetryError, RetryPolicy, Sleeper};

/// A playlist whose subtitles are on disk and ready to harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    /// Playlist display name.
    pub name: String,
    /// Directory holding the playlist's subtitle artifacts.
    pub directory: PathBuf,
}

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("cannot prepare archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Fetch(#[from] RetryError<FetchError>),
}

/// Drives the fetch capability for one playlist at a time.
pub struct FetchOrchestrator<F, S = crate::retry::ThreadSleeper, R = rand::rngs::StdRng> {
    fetcher: F,
    pacer: Pacer<S, R>,
    policy: RetryPolicy,
    config: HarvestConfig,
}

impl<F: SubtitleFetcher> FetchOrchestrator<F> {
    pub fn new(config: HarvestConfig, fetcher: F) -> Self {
        Self::with_pacer(config, fetcher, Pacer::new())
    }
}

impl<F, S, R> FetchOrchestrator<F, S, R>
where
    F: SubtitleFetcher,
    S: Sleeper,
    R: Rng,
{
    pub fn with_pacer(config: HarvestConfig, fetcher: F, pacer: Pacer<S, R>) -> Self {
        Self {
            fetcher,
            pacer,
            policy: RetryPolicy::from_config(&config.retry),
            config,
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn pacer_mut(&mut self) -> &mut Pacer<S, R> {
        &mut self.pacer
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches subtitles for `target`, retrying rate limits with backoff.
    ///
    /// Access restrictions and unclassified failures end the attempt loop at
    /// once; whatever the tool already wrote (and archived) stays on disk.
    pub fn acquire(&mut self, target: &PlaylistTarget) -> Result<Acquired, AcquireError> {
        let root = self.config.output_root.clone();
        let archive =
            ArchiveRecord::open(&root, &target.id).map_err(|source| AcquireError::Archive {
                path: ArchiveRecord::path_for(&root, &target.id),
                source,
            })?;
        tracing::info!(
            playlist = %target.url,
            id = %target.id,
            archived = archive.len(),
            "fetching playlist subtitles"
        );

        let options = FetchOptions::from_config(&self.config, archive.path());
        let fetcher = &mut self.fetcher;
        let result = run_with_retry(
            &self.policy,
            &mut self.pacer.sleeper,
            &mut self.pacer.rng,
            |attempt| {
                tracing::debug!(playlist = %target.url, attempt, "fetch attempt");
                fetcher.fetch(&target.url, &options)
            },
        );

        match result {
            Ok(info) => {
                let directory = info
                    .directory
                    .clone()
                    .unwrap_or_else(|| playlist_dir(&root, &info.title));
                tracing::info!(
                    playlist = %target.url,
                    title = %info.title,
                    entries = info.entries,
                    dir = %directory.display(),
                    "processed playlist"
                );
                Ok(Acquired {
                    name: info.title,
                    directory,
                })
            }
            Err(e) => {
                match &e {
                    RetryError::Abandoned { kind, .. } => {
                        tracing::warn!(
                            playlist = %target.url,
                            %kind,
                            "abandoning playlist; archived items are kept"
                        )
                    }
                    RetryError::Exhausted { attempts, .. } => {
                        tracing::warn!(playlist = %target.url, attempts, "retries exhausted")
                    }
                }
                Err(e.into())
            }
        }
    }
}

/// Default output directory for a playlist title: `{root}/{title}` with the
/// characters the fetch tool refuses in file names swapped for the same
/// look-alikes it writes (`/` and `\` to big solidi, `"*:<>?|` to full-width).
pub fn playlist_dir(root: &Path, title: &str) -> PathBuf {
    let name: String = title
        .chars()
        .map(|c| match c {
            '/' => '\u{29F8}',
            '\\' => '\u{29F9}',
            '"' | '*' | ':' | '<' | '>' | '?' | '|' => {
                char::from_u32(c as u32 + 0xFEE0).unwrap_or('_')
            }
            c => c,
        })
        .collect();
    root.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::PlaylistInfo;
    use crate::retry::{FailureKind, RecordingSleeper};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays scripted outcomes and records each call's options.
    struct Scripted {
        outcomes: VecDeque<Result<PlaylistInfo, FetchError>>,
        calls: Vec<FetchOptions>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<PlaylistInfo, FetchError>>) -> Self {
            Self {
                outcomes: outcomes.into(),
                calls: Vec::new(),
            }
        }
    }

    impl SubtitleFetcher for Scripted {
        fn fetch(
            &mut self,
            _url: &str,
            options: &FetchOptions,
        ) -> Result<PlaylistInfo, FetchError> {
            self.calls.push(options.clone());
            self.outcomes
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::other("script exhausted")))
        }
    }

    fn ok(title: &str) -> Result<PlaylistInfo, FetchError> {
        Ok(PlaylistInfo {
            title: title.to_string(),
            entries: 1,
            directory: None,
        })
    }

    fn orchestrator(
        root: &Path,
        outcomes: Vec<Result<PlaylistInfo, FetchError>>,
    ) -> FetchOrchestrator<Scripted, RecordingSleeper, StdRng> {
        let mut cfg = HarvestConfig::default();
        cfg.output_root = root.to_path_buf();
        cfg.cookies_file = None;
        FetchOrchestrator::with_pacer(
            cfg,
            Scripted::new(outcomes),
            Pacer::with(RecordingSleeper::default(), StdRng::seed_from_u64(42)),
        )
    }

    fn target() -> PlaylistTarget {
        PlaylistTarget::new("https://www.youtube.com/watch?v=x&list=PLtest")
    }

    #[test]
    fn success_returns_name_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = orchestrator(dir.path(), vec![ok("Khai")]);
        let acquired = o.acquire(&target()).unwrap();
        assert_eq!(acquired.name, "Khai");
        assert_eq!(acquired.directory, dir.path().join("Khai"));
        assert_eq!(o.fetcher().calls.len(), 1);
        assert!(o.pacer_mut().sleeper.naps.is_empty());
    }

    #[test]
    fn archive_is_created_and_passed_to_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = orchestrator(dir.path(), vec![ok("Khai")]);
        o.acquire(&target()).unwrap();
        let expected = dir.path().join("downloaded_videos_PLtest.txt");
        assert!(expected.exists());
        let opts = &o.fetcher().calls[0];
        assert_eq!(opts.archive, expected);
        assert!(opts.skip_download);
        assert!(opts.ignore_errors);
        assert!(opts.cookies.is_none());
    }

    #[test]
    fn rate_limit_backs_off_then_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = orchestrator(
            dir.path(),
            vec![Err(FetchError::rate_limited("HTTP Error 429")), ok("Mein")],
        );
        let acquired = o.acquire(&target()).unwrap();
        assert_eq!(acquired.name, "Mein");
        assert_eq!(o.fetcher().calls.len(), 2);
        let naps = &o.pacer_mut().sleeper.naps;
        assert_eq!(naps.len(), 1);
        assert!(naps[0] >= Duration::from_secs(1) && naps[0] <= Duration::from_secs(10));
    }

    #[test]
    fn rate_limit_never_exceeds_three_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let outcomes = (0..5).map(|_| Err(FetchError::rate_limited("429"))).collect();
        let mut o = orchestrator(dir.path(), outcomes);
        let err = o.acquire(&target()).unwrap_err();
        assert!(matches!(
            err,
            AcquireError::Fetch(RetryError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(o.fetcher().calls.len(), 3);
        let naps = o.pacer_mut().sleeper.naps.clone();
        assert_eq!(naps.len(), 2);
        // second backoff is scaled by attempt index
        assert!(naps[1] >= Duration::from_secs(2) && naps[1] <= Duration::from_secs(20));
    }

    #[test]
    fn access_restricted_is_terminal_without_sleep() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = orchestrator(
            dir.path(),
            vec![Err(FetchError::access_restricted("Private video")), ok("never")],
        );
        let err = o.acquire(&target()).unwrap_err();
        assert!(matches!(
            err,
            AcquireError::Fetch(RetryError::Abandoned {
                kind: FailureKind::AccessRestricted,
                ..
            })
        ));
        assert_eq!(o.fetcher().calls.len(), 1);
        assert!(o.pacer_mut().sleeper.naps.is_empty());
    }

    #[test]
    fn other_failure_is_terminal_without_sleep() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = orchestrator(dir.path(), vec![Err(FetchError::other("boom")), ok("never")]);
        assert!(o.acquire(&target()).is_err());
        assert_eq!(o.fetcher().calls.len(), 1);
        assert!(o.pacer_mut().sleeper.naps.is_empty());
    }

    #[test]
    fn reported_directory_wins_over_title() {
        let dir = tempfile::tempdir().unwrap();
        let written = dir.path().join("Khai ⧸ Vol 1");
        let mut o = orchestrator(
            dir.path(),
            vec![Ok(PlaylistInfo {
                title: "Khai / Vol 1".into(),
                entries: 2,
                directory: Some(written.clone()),
            })],
        );
        assert_eq!(o.acquire(&target()).unwrap().directory, written);
    }

    #[test]
    fn playlist_dir_replaces_separators() {
        assert_eq!(
            playlist_dir(Path::new("subtitles"), "A/B"),
            PathBuf::from("subtitles/A\u{29F8}B")
        );
    }

    #[test]
    fn playlist_dir_uses_full_width_look_alikes() {
        let root = Path::new("subtitles");
        assert_eq!(
            playlist_dir(root, "Khai: Vol 1"),
            root.join("Khai\u{FF1A} Vol 1")
        );
        assert_eq!(
            playlist_dir(root, r#"a"b*c<d>e?f|g\h"#),
            root.join("a\u{FF02}b\u{FF0A}c\u{FF1C}d\u{FF1E}e\u{FF1F}f\u{FF5C}g\u{29F9}h")
        );
    }
}
