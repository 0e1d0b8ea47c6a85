//! Turn a playlist's output directory into subtitle records.
//!
//! Artifacts are named `{video}.{lang}.{ext}`. The tree is enumerated once
//! into a map `video -> {lang -> path}`, then one record is materialized per
//! video. Unreadable files become null fields; they never stop the harvest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::dataset::SubtitleRecord;

/// Scans playlist directories for subtitle artifacts.
#[derive(Debug, Clone)]
pub struct Harvester {
    languages: Vec<String>,
    ext: String,
}

impl Harvester {
    pub fn new(languages: Vec<String>, ext: impl Into<String>) -> Self {
        Self {
            languages,
            ext: ext.into(),
        }
    }

    /// One record per distinct video found under `playlist_dir`.
    ///
    /// The playlist name is the directory's own name. A missing directory
    /// yields no records.
    pub fn harvest(&self, playlist_dir: &Path) -> Vec<SubtitleRecord> {
        let playlist_name = playlist_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let artifacts = self.index(playlist_dir);
        let records: Vec<SubtitleRecord> = artifacts
            .into_iter()
            .map(|(video, langs)| {
                let mut record = SubtitleRecord::new(playlist_name.clone(), video);
                for (lang, path) in langs {
                    if let Some(text) = read_subtitle_file(&path) {
                        record.subtitles.insert(lang, text);
                    }
                }
                record
            })
            .collect();

        tracing::debug!(
            dir = %playlist_dir.display(),
            records = records.len(),
            "harvested playlist directory"
        );
        records
    }

    /// Enumerate artifacts once: video base name -> language -> path.
    /// Files with no recognized language suffix still register their video.
    fn index(&self, dir: &Path) -> BTreeMap<String, BTreeMap<String, PathBuf>> {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut map: BTreeMap<String, BTreeMap<String, PathBuf>> = BTreeMap::new();
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((video, lang)) = self.split_artifact_name(name) else {
                continue;
            };
            let langs = map.entry(video.to_string()).or_default();
            if let Some(lang) = lang {
                langs.insert(lang.to_string(), path.clone());
            }
        }
        map
    }

    /// Splits `{video}.{lang}.{ext}` into `(video, Some(lang))`.
    /// Returns `(stem, None)` when the stem carries no known language and
    /// `None` when the file is not a subtitle artifact.
    pub fn split_artifact_name<'a>(
        &self,
        file_name: &'a str,
    ) -> Option<(&'a str, Option<&'a str>)> {
        let stem = file_name.strip_suffix(&self.ext)?.strip_suffix('.')?;
        if stem.is_empty() {
            return None;
        }
        for lang in &self.languages {
            let video = stem
                .strip_suffix(lang.as_str())
                .and_then(|s| s.strip_suffix('.'));
            if let Some(video) = video {
                if !video.is_empty() {
                    let lang_part = &stem[video.len() + 1..];
                    return Some((video, Some(lang_part)));
                }
            }
        }
        Some((stem, None))
    }
}

/// Reads an artifact as text; unreadable or non-UTF-8 files are logged and
/// treated as absent.
pub fn read_subtitle_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "error reading subtitle file");
            None
        }
    }
}
