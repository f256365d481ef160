//! Hashtag and mention extraction for post content.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\p{L}\p{N}_]+)").expect("Invalid hashtag regex"));

static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([a-zA-Z0-9_.]+)").expect("Invalid mention regex"));

/// Lowercased hashtags (without `#`), deduplicated in order of first use.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    dedup(&HASHTAG_REGEX, content)
}

/// Lowercased mentions (without `@`), deduplicated in order of first use.
pub fn extract_mentions(content: &str) -> Vec<String> {
    dedup(&MENTION_REGEX, content)
}

fn dedup(re: &Regex, content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    re.captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim_end_matches('.').to_lowercase()))
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// Case-insensitive substring test; `needle` is expected to be lowercased already.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_are_lowercased_and_deduplicated() {
        let tags = extract_hashtags("Shipping #Rust today! #rust #OpenSource");
        assert_eq!(tags, vec!["rust", "opensource"]);
    }

    #[test]
    fn mentions_drop_trailing_punctuation() {
        let mentions = extract_mentions("Thanks @Jane.Doe. and @bob_k!");
        assert_eq!(mentions, vec!["jane.doe", "bob_k"]);
    }

    #[test]
    fn no_tags_in_plain_text() {
        assert!(extract_hashtags("plain words only").is_empty());
        assert!(extract_mentions("mail me at home").is_empty());
    }

    #[test]
    fn substring_match_ignores_case() {
        assert!(contains_ci("Senior Engineer", "eng"));
        assert!(!contains_ci("Designer", "eng"));
    }
}
