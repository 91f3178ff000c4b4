//! Description normalization: keywords inside the intro window

use regex::Regex;
use std::sync::LazyLock;

use crate::policy::{KeywordPolicy, PlatformLimits, PRIMARY_PLACEHOLDER, SECONDARY_PLACEHOLDER};
use crate::text::{char_len, contains_ci, take_chars, truncate_at_word};

/// Sentence or clause end: punctuation followed by whitespace or end of text
static CLAUSE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?;:,](?:\s|$)").expect("Valid regex"));

/// Make sure the primary keyword and a secondary phrase appear within the
/// first `description_keyword_window` chars.
///
/// When they don't, a lead-in sentence is prepended; everything that was
/// already in the description is kept verbatim after it.
pub fn normalize_description(
    description: &str,
    policy: &KeywordPolicy,
    limits: &PlatformLimits,
) -> String {
    let body = if policy.strip_decorative_lead {
        strip_decorative_lead(description)
    } else {
        description
    };

    let window = take_chars(body, limits.description_keyword_window);
    let primary = policy.primary_phrase();
    let has_primary = contains_ci(window, &primary);
    let has_secondary =
        policy.secondary.is_empty() || policy.secondary.iter().any(|s| contains_ci(window, s));

    if has_primary && has_secondary {
        return body.to_string();
    }

    // A previous pass may already have prepended a (cut) lead-in
    let already_led = candidate_secondaries(policy)
        .any(|s| body.starts_with(&lead_in(policy, &primary, s, limits)));
    if already_led {
        return body.to_string();
    }

    let secondary = policy
        .secondary
        .iter()
        .find(|s| !contains_ci(window, s))
        .or_else(|| policy.secondary.first())
        .map(String::as_str);
    let lead = lead_in(policy, &primary, secondary, limits);

    tracing::debug!(
        has_primary,
        has_secondary,
        secondary = ?secondary,
        "Prepending description lead-in"
    );

    if body.trim().is_empty() {
        lead
    } else {
        format!("{}\n\n{}", lead, body)
    }
}

fn candidate_secondaries(policy: &KeywordPolicy) -> impl Iterator<Item = Option<&str>> {
    policy
        .secondary
        .iter()
        .map(|s| Some(s.as_str()))
        .chain(std::iter::once(None))
}

/// Build the lead-in sentence and cut it to fit the keyword window
fn lead_in(
    policy: &KeywordPolicy,
    primary: &str,
    secondary: Option<&str>,
    limits: &PlatformLimits,
) -> String {
    let sentence = match secondary {
        Some(secondary) => policy
            .lead_in_template
            .replace(PRIMARY_PLACEHOLDER, primary)
            .replace(SECONDARY_PLACEHOLDER, secondary.trim()),
        None => format!("{}.", primary),
    };
    fit_lead_in(&sentence, primary, limits.description_keyword_window)
}

/// Cut a lead-in at the last clause boundary inside the window, keeping
/// the primary keyword. Falls back to a word cut, or to the bare keyword
/// sentence when the template puts the keyword past the window.
fn fit_lead_in(sentence: &str, primary: &str, window: usize) -> String {
    if char_len(sentence) <= window {
        return sentence.to_string();
    }

    let limit = take_chars(sentence, window).len();
    let boundary = CLAUSE_END
        .find_iter(sentence)
        .map(|m| m.start() + 1)
        .filter(|end| *end <= limit)
        .last();

    if let Some(end) = boundary {
        let clause = &sentence[..end];
        if contains_ci(clause, primary) {
            return match clause.strip_suffix([',', ';', ':']) {
                Some(open) => format!("{}.", open),
                None => clause.to_string(),
            };
        }
    }

    let cut = truncate_at_word(sentence, window);
    if contains_ci(&cut, primary) {
        return cut;
    }

    let plain = format!("{}.", primary);
    if char_len(&plain) <= window {
        plain
    } else {
        primary.to_string()
    }
}

/// Drop leading lines that carry no letters or digits (emoji rows,
/// rulers, blank lines)
fn strip_decorative_lead(description: &str) -> &str {
    let mut offset = 0;
    for line in description.split_inclusive('\n') {
        if line.chars().any(char::is_alphanumeric) {
            return &description[offset..];
        }
        offset += line.len();
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY: &str = "Polymer Clay Earrings";

    fn policy() -> KeywordPolicy {
        KeywordPolicy::new(PRIMARY).with_secondary(["Gift for Her", "Handmade in Poland"])
    }

    fn normalize(description: &str) -> String {
        normalize_description(description, &policy(), &PlatformLimits::default())
    }

    #[test]
    fn test_empty_description_becomes_lead_in() {
        let policy = KeywordPolicy::new(PRIMARY).with_secondary(["Gift for Her"]);
        let result = normalize_description("", &policy, &PlatformLimits::default());

        assert_eq!(result, "Polymer Clay Earrings, Gift for Her.");
        assert!(char_len(&result) <= 160);
    }

    #[test]
    fn test_compliant_description_is_unchanged() {
        let description =
            "Lightweight polymer clay earrings made by hand. A perfect gift for her birthday.";
        assert_eq!(normalize(description), description);
    }

    #[test]
    fn test_lead_in_is_prepended_and_original_kept() {
        let description = "These daisies are sculpted by hand and baked twice.";
        let result = normalize(description);

        assert_eq!(
            result,
            format!("Polymer Clay Earrings, Gift for Her.\n\n{}", description)
        );
    }

    #[test]
    fn test_first_unmatched_secondary_is_used() {
        let description = "A lovely gift for her, sculpted by hand.";
        let result = normalize(description);

        assert!(result.starts_with("Polymer Clay Earrings, Handmade in Poland."));
    }

    #[test]
    fn test_keyword_beyond_window_counts_as_missing() {
        let description = format!("{} Polymer Clay Earrings, Gift for Her", "x".repeat(200));
        let result = normalize(&description);

        let window = take_chars(&result, 160);
        assert!(contains_ci(window, PRIMARY));
        assert!(result.ends_with(&description));
    }

    #[test]
    fn test_primary_only_policy_uses_plain_lead_in() {
        let policy = KeywordPolicy::new(PRIMARY);
        let result = normalize_description("Pastel daisies.", &policy, &PlatformLimits::default());
        assert_eq!(result, "Polymer Clay Earrings.\n\nPastel daisies.");
    }

    #[test]
    fn test_long_lead_in_is_cut_at_clause_boundary() {
        let policy = KeywordPolicy::new(PRIMARY)
            .with_secondary(["Lightweight Hypoallergenic Statement Jewelry"]);
        let limits = PlatformLimits {
            description_keyword_window: 40,
            ..Default::default()
        };

        let once = normalize_description("Sculpted by hand.", &policy, &limits);
        assert_eq!(once, "Polymer Clay Earrings.\n\nSculpted by hand.");

        let twice = normalize_description(&once, &policy, &limits);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_keyword_late_in_template_survives_cut() {
        let mut policy = KeywordPolicy::new(PRIMARY).with_secondary(["Lightweight Hypoallergenic"]);
        policy.lead_in_template = "Discover {secondary} and more {primary}".to_string();
        let limits = PlatformLimits {
            description_keyword_window: 40,
            ..Default::default()
        };

        let once = normalize_description("Sculpted by hand.", &policy, &limits);
        assert_eq!(once, "Polymer Clay Earrings.\n\nSculpted by hand.");
        assert!(contains_ci(take_chars(&once, 40), PRIMARY));

        let twice = normalize_description(&once, &policy, &limits);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_decorative_lead_is_stripped_when_enabled() {
        let mut policy = policy();
        policy.strip_decorative_lead = true;
        let description = "✨🌸✨\n\n────\nPolymer Clay Earrings, a sweet gift for her.";

        let result = normalize_description(description, &policy, &PlatformLimits::default());
        assert_eq!(result, "Polymer Clay Earrings, a sweet gift for her.");
    }

    #[test]
    fn test_decorative_lead_kept_by_default() {
        let description = "✨\nPolymer Clay Earrings, a sweet gift for her.";
        assert_eq!(normalize(description), description);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "Sculpted by hand.",
            "A lovely gift for her, sculpted by hand.",
            "Polymer clay earrings without any secondary phrase.",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
