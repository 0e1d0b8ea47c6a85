use std::collections::BTreeMap;

/// Identity of a record: `(playlist_name, video_name)`.
pub type RecordKey = (String, String);

/// Subtitle texts of one video in one playlist, keyed by language variant.
///
/// A language absent from `subtitles` is null for that record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleRecord {
    pub playlist_name: String,
    pub video_name: String,
    pub subtitles: BTreeMap<String, String>,
}

impl SubtitleRecord {
    pub fn new(playlist_name: impl Into<String>, video_name: impl Into<String>) -> Self {
        Self {
            playlist_name: playlist_name.into(),
            video_name: video_name.into(),
            subtitles: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly for tests and fixtures.
    pub fn with_text(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.subtitles.insert(lang.into(), text.into());
        self
    }

    pub fn text(&self, lang: &str) -> Option<&str> {
        self.subtitles.get(lang).map(String::as_str)
    }

    pub fn has(&self, lang: &str) -> bool {
        self.subtitles.contains_key(lang)
    }

    pub fn key(&self) -> RecordKey {
        (self.playlist_name.clone(), self.video_name.clone())
    }

    pub(crate) fn key_ref(&self) -> (&str, &str) {
        (&self.playlist_name, &self.video_name)
    }
}
