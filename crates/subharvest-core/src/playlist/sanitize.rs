//! Filesystem-safe name sanitization for playlist ids and titles.

/// Sanitizes a playlist id or title for use as a single path component.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims leading/trailing spaces and dots
/// - Collapses consecutive underscores introduced by replacement
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_path_component(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_replaced = false;

    for c in name.chars() {
        if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        } else {
            out.push(c);
            prev_replaced = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c == ' ' || c == '\t' || c == '.');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators() {
        assert_eq!(sanitize_path_component("rock/pop\\jazz"), "rock_pop_jazz");
    }

    #[test]
    fn keeps_inner_spaces_of_titles() {
        assert_eq!(sanitize_path_component("  Rahe Junoon  "), "Rahe Junoon");
    }

    #[test]
    fn trims_dots() {
        assert_eq!(sanitize_path_component("..hidden.."), "hidden");
    }

    #[test]
    fn control_chars_collapse() {
        assert_eq!(sanitize_path_component("a\x00\x01b"), "a_b");
    }

    #[test]
    fn long_names_cut_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_path_component(&long);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
