//! Tag optimization: phrase expansion, per-tag budget, count budget

use std::collections::HashSet;

use crate::policy::{KeywordPolicy, PlatformLimits};
use crate::text::{is_single_word, phrase_key, truncate_at_word};

/// Optimize a tag list against the policy and platform limits.
///
/// Earlier tags are treated as more important: when the list is too long
/// the tail is dropped, and when the list is full the primary keyword takes
/// the last slot. With room to spare the primary goes first, followed by
/// any core tags that still fit. Never fails; oversized tags and
/// replacement phrases are shortened instead.
///
/// Assumes the policy has been validated against `limits`.
pub fn optimize_tags(
    tags: &[String],
    policy: &KeywordPolicy,
    limits: &PlatformLimits,
) -> Vec<String> {
    let primary = policy.primary_phrase();
    let primary_key = phrase_key(&primary);

    let unique = dedup_tags(tags.iter().map(|t| t.trim().to_string()));
    let mut optimized = dedup_tags(unique.into_iter().map(|tag| fit_tag(tag, policy, limits)));

    if optimized.len() > limits.max_tags {
        tracing::debug!(
            dropped = ?&optimized[limits.max_tags..],
            "Dropping lowest-priority tags"
        );
        optimized.truncate(limits.max_tags);
    }

    let primary_at = match optimized.iter().position(|t| phrase_key(t) == primary_key) {
        Some(index) => index,
        None if optimized.len() >= limits.max_tags && !optimized.is_empty() => {
            let last = optimized.len() - 1;
            let evicted = std::mem::replace(&mut optimized[last], primary);
            tracing::debug!(evicted = %evicted, "Primary keyword takes the last tag slot");
            last
        }
        None => {
            optimized.insert(0, primary);
            0
        }
    };

    let mut next = primary_at + 1;
    for core in &policy.core_tags {
        if optimized.len() >= limits.max_tags {
            break;
        }
        let core = core.split_whitespace().collect::<Vec<_>>().join(" ");
        let key = phrase_key(&core);
        if core.is_empty() || optimized.iter().any(|t| phrase_key(t) == key) {
            continue;
        }
        tracing::debug!(tag = %core, "Adding core tag");
        optimized.insert(next, core);
        next += 1;
    }

    optimized
}

/// Expand and shorten one tag until it settles; a cut can leave a weak
/// word behind, and a replacement can be weak itself
fn fit_tag(tag: String, policy: &KeywordPolicy, limits: &PlatformLimits) -> String {
    let mut tag = tag;
    for _ in 0..policy.weak_tags.len() + 2 {
        let expanded = match policy.weak_tag_phrase(&tag) {
            Some(phrase) if is_single_word(&tag) => {
                tracing::debug!(tag = %tag, phrase = %phrase, "Expanding weak tag");
                phrase.trim().to_string()
            }
            _ => tag.clone(),
        };
        let fitted = truncate_at_word(&expanded, limits.max_tag_len);
        if fitted == tag {
            break;
        }
        tag = fitted;
    }
    tag
}

/// Case-insensitive de-duplication keeping the first spelling; empty tags
/// are dropped
fn dedup_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| !tag.is_empty() && seen.insert(phrase_key(tag)))
        .collect()
}
