//! URL slug generation and validation.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum slug length, matching the storage column width.
pub const MAX_SLUG_LENGTH: usize = 50;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

static VALID_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// Derives a URL slug from free text: lowercased, runs of non-alphanumeric
/// characters collapsed to single hyphens, trimmed and length-capped.
///
/// Returns an empty string when the input contains no usable characters;
/// callers decide how to handle that (typically by rejecting the title).
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let hyphenated = NON_SLUG_CHARS.replace_all(&lowered, "-");
    let trimmed = hyphenated.trim_matches('-');

    if trimmed.len() <= MAX_SLUG_LENGTH {
        return trimmed.to_string();
    }
    trimmed[..MAX_SLUG_LENGTH].trim_end_matches('-').to_string()
}

/// Returns whether `slug` is a valid URL slug: non-empty, within the length
/// cap, lowercase alphanumeric runs separated by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LENGTH && VALID_SLUG.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("The Daily Drip #42"), "the-daily-drip-42");
        assert_eq!(slugify("  --hello--  "), "hello");
        assert_eq!(slugify("Déjà Vu"), "d-j-vu");
    }

    #[test]
    fn test_slugify_empty_input() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_caps_length_without_trailing_hyphen() {
        let long = "a ".repeat(60);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("episode-12"));
        assert!(is_valid_slug("a"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("Upper"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)));
    }
}
