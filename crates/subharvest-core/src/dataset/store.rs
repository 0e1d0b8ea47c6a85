//! Tabular persistence of subtitle records (xlsx).
//!
//! Schema: `playlist_name, video_name, subtitles_{lang}...`, one row per
//! record, empty cell = null. Saves go through a `.part` file and a rename so
//! an interrupted save never leaves a truncated dataset behind.

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::SubtitleRecord;

/// Longest text an xlsx cell can hold.
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

const PLAYLIST_COL: &str = "playlist_name";
const VIDEO_COL: &str = "video_name";
const SUBTITLE_COL_PREFIX: &str = "subtitles_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read table {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("write table {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("table {path} has no `{column}` column")]
    Schema { path: PathBuf, column: &'static str },
}

/// Load/save capability for record tables.
pub trait TableStore {
    /// Loads a table; `Ok(None)` when nothing was persisted at `path` yet.
    fn load(&self, path: &Path) -> Result<Option<Vec<SubtitleRecord>>, StoreError>;

    fn save(&self, records: &[SubtitleRecord], path: &Path) -> Result<(), StoreError>;
}

impl<T: TableStore + ?Sized> TableStore for &T {
    fn load(&self, path: &Path) -> Result<Option<Vec<SubtitleRecord>>, StoreError> {
        (**self).load(path)
    }

    fn save(&self, records: &[SubtitleRecord], path: &Path) -> Result<(), StoreError> {
        (**self).save(records, path)
    }
}

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

/// Excel workbook store: first worksheet, header row, one record per row.
#[derive(Debug, Clone)]
pub struct XlsxStore {
    languages: Vec<String>,
}

impl XlsxStore {
    /// `languages` fixes the leading subtitle columns; languages found in
    /// records beyond these are appended in sorted order.
    pub fn new(languages: Vec<String>) -> Self {
        Self { languages }
    }

    fn columns_for(&self, records: &[SubtitleRecord]) -> Vec<String> {
        let mut langs = self.languages.clone();
        let extra: BTreeSet<&String> = records
            .iter()
            .flat_map(|r| r.subtitles.keys())
            .filter(|l| !self.languages.contains(l))
            .collect();
        langs.extend(extra.into_iter().cloned());
        langs
    }
}

impl TableStore for XlsxStore {
    fn load(&self, path: &Path) -> Result<Option<Vec<SubtitleRecord>>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let read_err = |message: String| StoreError::Read {
            path: path.to_path_buf(),
            message,
        };

        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path).map_err(|e: calamine::XlsxError| read_err(e.to_string()))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(r) => r.map_err(|e| read_err(e.to_string()))?,
            None => return Ok(Some(Vec::new())),
        };

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Some(Vec::new()));
        };
        let header: Vec<Option<String>> = header.iter().map(cell_text).collect();
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h.as_deref() == Some(name))
                .ok_or(StoreError::Schema {
                    path: path.to_path_buf(),
                    column: name,
                })
        };
        let playlist_idx = find(PLAYLIST_COL)?;
        let video_idx = find(VIDEO_COL)?;
        let lang_cols: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                h.as_deref()
                    .and_then(|h| h.strip_prefix(SUBTITLE_COL_PREFIX))
                    .map(|lang| (i, lang.to_string()))
            })
            .collect();

        let mut records = Vec::new();
        for row in rows {
            let get = |i: usize| row.get(i).and_then(cell_text);
            let (Some(playlist), Some(video)) = (get(playlist_idx), get(video_idx)) else {
                tracing::warn!(path = %path.display(), "skipping row without identity key");
                continue;
            };
            let mut record = SubtitleRecord::new(playlist, video);
            for (i, lang) in &lang_cols {
                if let Some(text) = get(*i) {
                    record.subtitles.insert(lang.clone(), text);
                }
            }
            records.push(record);
        }
        tracing::debug!(path = %path.display(), rows = records.len(), "loaded table");
        Ok(Some(records))
    }

    fn save(&self, records: &[SubtitleRecord], path: &Path) -> Result<(), StoreError> {
        let write_err = |e: rust_xlsxwriter::XlsxError| StoreError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let langs = self.columns_for(records);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        let mut header = vec![PLAYLIST_COL.to_string(), VIDEO_COL.to_string()];
        header.extend(langs.iter().map(|l| format!("{SUBTITLE_COL_PREFIX}{l}")));
        for (col, name) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, name).map_err(write_err)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet
                .write_string(row, 0, fit_cell(&record.playlist_name, path))
                .map_err(write_err)?;
            sheet
                .write_string(row, 1, fit_cell(&record.video_name, path))
                .map_err(write_err)?;
            for (j, lang) in langs.iter().enumerate() {
                if let Some(text) = record.text(lang) {
                    sheet
                        .write_string(row, (j + 2) as u16, fit_cell(text, path))
                        .map_err(write_err)?;
                }
            }
        }

        let tmp = temp_path(path);
        workbook.save(&tmp).map_err(write_err)?;
        fs::rename(&tmp, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), rows = records.len(), "saved table");
        Ok(())
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Cuts text that would not fit in one xlsx cell.
fn fit_cell<'a>(text: &'a str, path: &Path) -> std::borrow::Cow<'a, str> {
    match text.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        None => std::borrow::Cow::Borrowed(text),
        Some((cut, _)) => {
            tracing::warn!(
                path = %path.display(),
                chars = text.chars().count(),
                "cell text exceeds xlsx limit; truncating"
            );
            std::borrow::Cow::Owned(text[..cut].to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> Vec<String> {
        vec!["en".into(), "ur".into(), "auto".into()]
    }

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("subtitles/all.xlsx"));
        assert_eq!(p.to_string_lossy(), "subtitles/all.xlsx.part");
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = XlsxStore::new(langs());
        assert!(store.load(&dir.path().join("nope.xlsx")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_keeps_nulls_and_texts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("p.xlsx");
        let store = XlsxStore::new(langs());
        let records = vec![
            SubtitleRecord::new("Khai", "Ep 1")
                .with_text("en", "WEBVTT\n\n00:00.000 --> 00:01.000\nhello")
                .with_text("ur", "WEBVTT\n\nسلام")
                .with_text("auto", "WEBVTT"),
            SubtitleRecord::new("Khai", "Ep 2").with_text("en", "WEBVTT\n\nbye"),
        ];
        store.save(&records, &path).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());

        let loaded = store.load(&path).unwrap().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn extra_languages_get_their_own_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.xlsx");
        let store = XlsxStore::new(langs());
        let records = vec![SubtitleRecord::new("P", "V").with_text("fr", "bonjour")];
        store.save(&records, &path).unwrap();
        let loaded = store.load(&path).unwrap().unwrap();
        assert_eq!(loaded[0].text("fr"), Some("bonjour"));
        assert_eq!(loaded[0].text("en"), None);
    }

    #[test]
    fn oversized_text_is_truncated() {
        let long = "a".repeat(XLSX_MAX_CELL_CHARS + 10);
        let cut = fit_cell(&long, Path::new("t.xlsx"));
        assert_eq!(cut.chars().count(), XLSX_MAX_CELL_CHARS);
        assert!(matches!(
            fit_cell("short", Path::new("t.xlsx")),
            std::borrow::Cow::Borrowed(_)
        ));
    }

    #[test]
    fn save_into_unwritable_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a dir").unwrap();
        let store = XlsxStore::new(langs());
        let err = store.save(&[], &blocker.join("out.xlsx")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn non_workbook_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"plain text, not a zip").unwrap();
        let store = XlsxStore::new(langs());
        let err = store.load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
