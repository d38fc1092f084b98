//! Slug derivation and clean-up.

use regex::Regex;
use std::sync::LazyLock;

static NOT_SLUG_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-\s.]").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("static regex"));
static NOT_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-.]").expect("static regex"));

/// Derives a slug from a board name: lowercase, letters, digits, dots and
/// single hyphens, no leading or trailing hyphen.
pub fn generate_slug(name: &str) -> String {
    let lower = name.to_lowercase();
    let kept = NOT_SLUG_SOURCE.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(&kept, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Lowercases a hand-edited slug and strips every disallowed character.
pub fn sanitize_slug(value: &str) -> String {
    NOT_SLUG.replace_all(&value.to_lowercase(), "").into_owned()
}

/// A slug the server accepts as a folder name: already sanitized, not
/// empty, and not starting with a dot.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.starts_with('.') && sanitize_slug(slug) == slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_slug_from_board_name() {
        assert_eq!(generate_slug("Test Board"), "test-board");
        assert_eq!(generate_slug("  Sonoff  Basic R2 (v1.1)!  "), "sonoff-basic-r2-v1.1");
        assert_eq!(generate_slug("a -- b"), "a-b");
        assert_eq!(generate_slug("---"), "");
    }

    #[test]
    fn sanitize_slug_removes_every_disallowed_character() {
        // A single non-global replacement would leave "ab@c" here.
        assert_eq!(sanitize_slug("A!b@C"), "abc");
        assert_eq!(sanitize_slug("my board"), "myboard");
        assert_eq!(sanitize_slug("esp32-c3.v2"), "esp32-c3.v2");
    }

    #[test]
    fn valid_slugs_are_safe_folder_names() {
        assert!(is_valid_slug("sonoff-basic-r2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("Upper"));
    }
}
