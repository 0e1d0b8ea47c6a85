//! Playlist targets and their stable identifiers.
//!
//! The identifier namespaces the per-playlist archive file, so it must be a
//! pure function of the input URL.

mod sanitize;

pub use sanitize::sanitize_path_component;

/// Identifier used when neither a `list=` parameter nor a path segment is usable.
const FALLBACK_ID: &str = "playlist";

const LIST_MARKER: &str = "list=";

/// A playlist to process: the URL (or bare id) as given plus its derived id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistTarget {
    pub url: String,
    pub id: String,
}

impl PlaylistTarget {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let id = playlist_id_from_url(&url);
        Self { url, id }
    }
}

impl std::fmt::Display for PlaylistTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Derives the playlist identifier from a URL.
///
/// Prefers the value after the last `list=` marker (up to the next `&`),
/// otherwise the last non-empty path segment. Bare ids pass through.
///
/// # Examples
///
/// - `"https://www.youtube.com/watch?v=x&list=PLabc"` → `"PLabc"`
/// - `"https://www.youtube.com/playlist/PLxyz"` → `"PLxyz"`
pub fn playlist_id_from_url(url: &str) -> String {
    let raw = match url.rfind(LIST_MARKER) {
        Some(pos) => {
            let rest = &url[pos + LIST_MARKER.len()..];
            rest.split(['&', '#']).next().unwrap_or_default().to_string()
        }
        None => last_path_segment(url),
    };
    let id = sanitize_path_component(&raw);
    if id.is_empty() {
        FALLBACK_ID.to_string()
    } else {
        id
    }
}

fn last_path_segment(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(seg) = parsed
            .path_segments()
            .and_then(|segs| segs.filter(|s| !s.is_empty()).last())
        {
            return seg.to_string();
        }
        return parsed.host_str().unwrap_or_default().to_string();
    }
    url.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}
