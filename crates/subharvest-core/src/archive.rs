//! Per-playlist download archive.
//!
//! One line per fetched video, appended by the fetch tool as each item
//! completes. The file is never rewritten; an interrupted run loses at most
//! the item in flight.
//!
//! During a run the fetch tool is the only writer. [`ArchiveRecord::contains`]
//! and [`ArchiveRecord::append`] are the inspection and manual-resume API for
//! tooling outside the run, e.g. marking a video as done by hand so the next
//! run skips it.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name prefix of archive files under the output root.
pub const ARCHIVE_PREFIX: &str = "downloaded_videos_";

/// Set of video ids already fetched for one playlist, backed by an append-only file.
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    path: PathBuf,
    ids: HashSet<String>,
}

impl ArchiveRecord {
    /// Archive path for a playlist: `{root}/downloaded_videos_{playlist_id}.txt`.
    pub fn path_for(root: &Path, playlist_id: &str) -> PathBuf {
        root.join(format!("{ARCHIVE_PREFIX}{playlist_id}.txt"))
    }

    /// Opens the archive for a playlist, creating an empty file on first use.
    pub fn open(root: &Path, playlist_id: &str) -> io::Result<Self> {
        let path = Self::path_for(root, playlist_id);
        ensure_exists(&path)?;
        Self::load(&path)
    }

    /// Reads an existing archive. Lines are either `{id}` or `{extractor} {id}`;
    /// blank lines are ignored.
    pub fn load(path: &Path) -> io::Result<Self> {
        let ids = match fs::read_to_string(path) {
            Ok(data) => data.lines().filter_map(parse_line).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path: path.to_path_buf(),
            ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `video_id` is already archived and will be skipped by the next fetch.
    pub fn contains(&self, video_id: &str) -> bool {
        self.ids.contains(video_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Records an archive line (`{id}` or `{extractor} {id}`). Already-known
    /// ids are not written twice. Returns whether the id was new.
    pub fn append(&mut self, entry: &str) -> io::Result<bool> {
        let Some(id) = parse_line(entry) else {
            return Ok(false);
        };
        if self.ids.contains(&id) {
            return Ok(false);
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(f, "{}", entry.trim())?;
        f.sync_data()?;
        self.ids.insert(id);
        Ok(true)
    }
}

fn parse_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    // yt-dlp writes "{extractor} {id}"; the id is the last token.
    line.split_whitespace().last().map(str::to_string)
}

/// Creates an empty archive file (and parent dirs) if it does not exist yet.
pub fn ensure_exists(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_namespaced_by_playlist_id() {
        let p = ArchiveRecord::path_for(Path::new("subtitles"), "PLabc");
        assert_eq!(p, PathBuf::from("subtitles/downloaded_videos_PLabc.txt"));
    }

    #[test]
    fn open_creates_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ArchiveRecord::open(dir.path(), "PLnew").unwrap();
        assert!(archive.is_empty());
        assert!(archive.path().exists());
    }

    #[test]
    fn append_grows_monotonically_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = ArchiveRecord::open(dir.path(), "PLgrow").unwrap();
        assert!(archive.append("youtube abc").unwrap());
        assert!(archive.contains("abc"));
        assert!(archive.append("vid2").unwrap());
        assert!(!archive.append("vid2").unwrap());
        assert!(!archive.append("   ").unwrap());
        assert_eq!(archive.len(), 2);

        let reloaded = ArchiveRecord::open(dir.path(), "PLgrow").unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("abc"));
        assert!(reloaded.contains("vid2"));
    }

    #[test]
    fn load_accepts_extractor_prefixed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "youtube 8kPif5oSbw4\n\nyoutube 4L2V7KueDBs\n").unwrap();
        let archive = ArchiveRecord::load(&path).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.contains("8kPif5oSbw4"));
    }

    #[test]
    fn reopening_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = ArchiveRecord::path_for(dir.path(), "PLkeep");
        fs::write(&path, "youtube one\n").unwrap();
        let archive = ArchiveRecord::open(dir.path(), "PLkeep").unwrap();
        assert!(archive.contains("one"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "youtube one\n");
    }

    #[test]
    fn video_marked_by_hand_is_seen_by_the_next_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = ArchiveRecord::open(dir.path(), "PLx").unwrap();
        assert!(!a.contains("skipme"));
        assert!(a.append("youtube skipme").unwrap());

        let reopened = ArchiveRecord::open(dir.path(), "PLx").unwrap();
        assert!(reopened.contains("skipme"));
        assert_eq!(reopened.len(), 1);
    }
}
