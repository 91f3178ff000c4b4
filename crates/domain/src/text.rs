//! Character-aware string helpers shared by the normalizers
//!
//! Every length here is a count of `char`s, so multi-byte letters in
//! listing text (`ó`, `ż`, ...) count once and are never split.

/// Length in chars
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `n`th char, or `s.len()` if the string is shorter
pub fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// The first `n` chars of `s`
pub fn take_chars(s: &str, n: usize) -> &str {
    &s[..byte_offset(s, n)]
}

/// Shorten `s` to at most `limit` chars, cutting at the last whitespace
/// boundary within the limit and falling back to a hard cut when the
/// first word alone is longer than the limit.
pub fn truncate_at_word(s: &str, limit: usize) -> String {
    if char_len(s) <= limit {
        return s.to_string();
    }

    let head = take_chars(s, limit);
    let next_is_space = s[head.len()..]
        .chars()
        .next()
        .is_some_and(char::is_whitespace);
    if next_is_space {
        return head.trim_end().to_string();
    }

    match head.rfind(char::is_whitespace) {
        Some(pos) if !head[..pos].trim_end().is_empty() => head[..pos].trim_end().to_string(),
        _ => head.trim_end().to_string(),
    }
}

/// Case-insensitive substring test
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Comparison key for a single word: lower-cased with surrounding
/// punctuation removed. Pure punctuation yields an empty key.
pub fn word_key(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Comparison key for a whole phrase or tag
pub fn phrase_key(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// True if `s` is one whitespace-free word
pub fn is_single_word(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && !trimmed.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_at_word_keeps_short_input() {
        assert_eq!(truncate_at_word("gift for her", 20), "gift for her");
    }

    #[test]
    fn test_truncate_at_word_cuts_at_last_space() {
        assert_eq!(
            truncate_at_word("hypoallergenic earrings", 20),
            "hypoallergenic"
        );
    }

    #[test]
    fn test_truncate_at_word_uses_boundary_at_limit() {
        // char 21 is a space, so the first 20 chars end on a word boundary
        assert_eq!(
            truncate_at_word("abcdefghij abcdefghi xyz", 20),
            "abcdefghij abcdefghi"
        );
    }

    #[test]
    fn test_truncate_at_word_hard_cuts_single_word() {
        assert_eq!(
            truncate_at_word("supercalifragilisticexpialidocious", 20),
            "supercalifragilistic"
        );
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "ŻÓŁĆ ŻÓŁĆ ŻÓŁĆ";
        assert_eq!(truncate_at_word(text, 10), "ŻÓŁĆ ŻÓŁĆ");
        assert_eq!(take_chars("żółw", 2), "żó");
    }

    #[test]
    fn test_word_key_strips_punctuation() {
        assert_eq!(word_key("Earrings,"), "earrings");
        assert_eq!(word_key("(Różowe)"), "różowe");
        assert_eq!(word_key("-"), "");
    }

    #[test]
    fn test_phrase_key_normalizes_spacing_and_case() {
        assert_eq!(phrase_key("  Gift   for HER "), "gift for her");
    }

    #[test]
    fn test_is_single_word() {
        assert!(is_single_word("cute"));
        assert!(!is_single_word("cute earrings"));
        assert!(!is_single_word("   "));
    }
}
