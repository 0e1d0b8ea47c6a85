//! Classify fetch-tool diagnostics into failure kinds.

use crate::retry::FailureKind;

const RATE_LIMIT_MARKERS: &[&str] = &["HTTP Error 429", "Too Many Requests"];

const RESTRICTED_MARKERS: &[&str] = &[
    "Private video",
    "Sign in if you've been granted access",
    "Video unavailable",
    "This video is private",
];

/// Classify the diagnostic text of a failed fetch.
///
/// Rate limiting wins over access restriction when both appear: a throttled
/// playlist is worth retrying even if one item in it is private.
pub fn classify_message(text: &str) -> FailureKind {
    if RATE_LIMIT_MARKERS.iter().any(|m| text.contains(m)) {
        return FailureKind::RateLimited;
    }
    if RESTRICTED_MARKERS.iter().any(|m| text.contains(m)) {
        return FailureKind::AccessRestricted;
    }
    FailureKind::Other
}

/// Last `max_lines` non-empty lines of tool output, for error messages.
pub fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).filter(|l| !l.is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_is_rate_limited() {
        assert_eq!(
            classify_message("ERROR: [youtube] abc: Unable to download webpage: HTTP Error 429: Too Many Requests"),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn private_and_sign_in_are_restricted() {
        assert_eq!(
            classify_message("ERROR: [youtube] xyz: Private video. Sign in if you've been granted access to this video"),
            FailureKind::AccessRestricted
        );
        assert_eq!(
            classify_message("ERROR: [youtube] xyz: Video unavailable"),
            FailureKind::AccessRestricted
        );
    }

    #[test]
    fn rate_limit_takes_precedence() {
        assert_eq!(
            classify_message("Private video\nHTTP Error 429"),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn anything_else_is_other() {
        assert_eq!(classify_message("ERROR: Unsupported URL"), FailureKind::Other);
        assert_eq!(classify_message(""), FailureKind::Other);
    }

    #[test]
    fn tail_keeps_last_non_empty_lines() {
        assert_eq!(tail_lines("a\n\nb\nc\n\n", 2), "b\nc");
        assert_eq!(tail_lines("", 3), "");
    }
}
