//! Title normalization: keyword first, no repeated words, within budget

use crate::policy::{KeywordPolicy, PlatformLimits};
use crate::text::{char_len, word_key};

/// Separator punctuation stripped from the end of a title
const TRAILING_SEPARATORS: &[char] = &[',', ';', ':', '-', '|', '/', '–', '—'];

/// Rewrite a title so it leads with the primary keyword, repeats no word,
/// and fits within `max_title_len`.
///
/// Assumes the policy has been validated against `limits`.
pub fn normalize_title(title: &str, policy: &KeywordPolicy, limits: &PlatformLimits) -> String {
    let primary: Vec<&str> = policy.primary.split_whitespace().collect();
    let tokens: Vec<&str> = title.split_whitespace().collect();

    if tokens.is_empty() {
        return primary.join(" ");
    }

    let ordered: Vec<&str> = if has_keyword_prefix(&tokens, &primary) {
        tokens
    } else {
        primary.iter().chain(tokens.iter()).copied().collect()
    };

    let mut words = tidy_separators(dedup_words(ordered));

    if char_len(&words.join(" ")) > limits.max_title_len {
        let keyword = dedup_words(primary);
        words = tidy_separators(fit_words(words, &keyword, limits.max_title_len));
    }

    let normalized = words.join(" ");
    if normalized != title {
        tracing::debug!(before = %title, after = %normalized, "Normalized title");
    }
    normalized
}

fn has_keyword_prefix(tokens: &[&str], primary: &[&str]) -> bool {
    tokens.len() >= primary.len()
        && tokens
            .iter()
            .zip(primary)
            .all(|(token, keyword)| word_key(token) == word_key(keyword))
}

/// Keep the first occurrence of each word; separators always survive
fn dedup_words(tokens: Vec<&str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokens
        .into_iter()
        .filter(|token| {
            let key = word_key(token);
            key.is_empty() || seen.insert(key)
        })
        .map(str::to_string)
        .collect()
}

/// Drop doubled and trailing separators left behind by removed words
fn tidy_separators(words: Vec<String>) -> Vec<String> {
    let mut tidy: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        let is_separator = word_key(&word).is_empty();
        let after_separator = tidy.last().is_some_and(|prev| word_key(prev).is_empty());
        if is_separator && (tidy.is_empty() || after_separator) {
            continue;
        }
        tidy.push(word);
    }

    while tidy.last().is_some_and(|w| word_key(w).is_empty()) {
        tidy.pop();
    }

    if let Some(last) = tidy.last_mut() {
        let trimmed = last.trim_end_matches(TRAILING_SEPARATORS);
        if trimmed.len() != last.len() {
            *last = trimmed.to_string();
        }
    }

    tidy
}

/// Keep whole words while the joined title stays within `max_len`.
///
/// The leading keyword words are never dropped. When punctuation glued to
/// them pushes the lead past `max_len`, the bare keyword takes their place.
fn fit_words(words: Vec<String>, keyword: &[String], max_len: usize) -> Vec<String> {
    let protected = keyword.len().min(words.len());
    let mut kept: Vec<String> = words[..protected].to_vec();
    if char_len(&kept.join(" ")) > max_len {
        kept = keyword.to_vec();
    }

    let mut len = char_len(&kept.join(" "));
    for word in words.into_iter().skip(protected) {
        let added = if kept.is_empty() {
            char_len(&word)
        } else {
            char_len(&word) + 1
        };
        if len + added > max_len {
            break;
        }
        len += added;
        kept.push(word);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const PRIMARY: &str = "Polymer Clay Earrings";

    fn policy() -> KeywordPolicy {
        KeywordPolicy::new(PRIMARY)
    }

    fn normalize(title: &str) -> String {
        normalize_title(title, &policy(), &PlatformLimits::default())
    }

    #[test]
    fn test_keyword_moves_to_front_and_duplicates_are_removed() {
        let result = normalize("Kokardki Różowe - Handmade Earrings, Polymer Clay");

        assert_eq!(result, "Polymer Clay Earrings Kokardki Różowe - Handmade");
        assert!(result.starts_with(PRIMARY));
        assert!(char_len(&result) <= 140);
    }

    #[test]
    fn test_empty_title_becomes_primary_keyword() {
        assert_eq!(normalize(""), PRIMARY);
        assert_eq!(normalize("   "), PRIMARY);
    }

    #[test]
    fn test_compliant_title_is_unchanged() {
        let title = "Polymer Clay Earrings, Boho Daisy Studs - Gift for Her";
        assert_eq!(normalize(title), title);
    }

    #[test]
    fn test_prefix_match_ignores_case() {
        let title = "polymer clay earrings with pearls";
        assert_eq!(normalize(title), title);
    }

    #[test]
    fn test_repeated_words_keep_first_occurrence() {
        let result = normalize("Polymer Clay Earrings Boho boho Studs BOHO Studs");
        assert_eq!(result, "Polymer Clay Earrings Boho Studs");
    }

    #[test]
    fn test_long_title_truncates_at_word_boundary() {
        let words: Vec<String> = (0..40).map(|i| format!("word{i}")).collect();
        let title = format!("{} {}", PRIMARY, words.join(" "));

        let result = normalize(&title);

        assert!(char_len(&result) <= 140);
        assert!(result.starts_with(PRIMARY));
        let last = result.split_whitespace().last().unwrap();
        assert!(words.iter().any(|w| w == last), "cut mid-word: {last}");
    }

    #[test]
    fn test_truncation_drops_trailing_separator() {
        let limits = PlatformLimits {
            max_title_len: 30,
            ..Default::default()
        };
        let result = normalize_title(
            "Polymer Clay Earrings Daisy - Summer Collection",
            &policy(),
            &limits,
        );
        assert_eq!(result, "Polymer Clay Earrings Daisy");
    }

    #[test]
    fn test_keyword_at_limit_survives_trailing_punctuation() {
        let mut words: Vec<String> = (0..20).map(|i| format!("word{i:02}")).collect();
        words[19].push('s');
        let primary = words.join(" ");
        assert_eq!(char_len(&primary), 140);

        let result = normalize_title(
            &format!("{primary}, Daisy Studs"),
            &KeywordPolicy::new(&primary),
            &PlatformLimits::default(),
        );

        assert_eq!(result, primary);
    }

    #[test]
    fn test_keyword_with_inner_punctuation_is_kept_when_cut() {
        let limits = PlatformLimits {
            max_title_len: 24,
            ..Default::default()
        };
        let result = normalize_title(
            "Polymer Clay, Earrings Daisy Studs",
            &policy(),
            &limits,
        );

        assert_eq!(result, "Polymer Clay, Earrings");
    }

    #[test]
    fn test_title_respects_length_property() {
        let titles = [
            "",
            "Earrings",
            "Clay Clay Clay Earrings Polymer",
            "Boho Daisy Studs, Pastel Flowers, Gift for Her, Lightweight, Hypoallergenic Hooks, Spring Summer Jewelry, Handmade in Poland by a small studio",
            "Kokardki Różowe - Handmade Earrings, Polymer Clay",
        ];
        for title in titles {
            let result = normalize(title);
            assert!(char_len(&result) <= 140, "too long: {result}");
            assert!(result.starts_with(PRIMARY), "no keyword lead: {result}");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let titles = [
            "Kokardki Różowe - Handmade Earrings, Polymer Clay",
            "Daisy - - Earrings, Clay -",
            "Gift for Her, Earrings, Polymer",
            "Boho Daisy Studs, Pastel Flowers, Gift for Her, Lightweight, Hypoallergenic Hooks, Spring Summer Jewelry, Handmade in Poland by a small studio",
        ];
        for title in titles {
            let once = normalize(title);
            assert_eq!(normalize(&once), once, "not idempotent for {title}");
        }
    }

    #[test]
    fn test_output_words_come_from_input_or_keyword() {
        let title = "Pastel Daisy Studs, Clay Earrings - Gift for Her";
        let result = normalize(title);

        let allowed: HashSet<String> = title
            .split_whitespace()
            .chain(PRIMARY.split_whitespace())
            .map(word_key)
            .collect();
        for word in result.split_whitespace() {
            assert!(allowed.contains(&word_key(word)), "invented word: {word}");
        }
    }
}
