//! Keyword policy and platform constraints

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::text::{char_len, is_single_word, truncate_at_word};

/// Placeholder for the primary phrase in a lead-in template
pub const PRIMARY_PLACEHOLDER: &str = "{primary}";
/// Placeholder for the secondary phrase in a lead-in template
pub const SECONDARY_PLACEHOLDER: &str = "{secondary}";

/// Default lead-in sentence prepended to descriptions
pub const DEFAULT_LEAD_IN_TEMPLATE: &str = "{primary}, {secondary}.";

/// Marketplace limits every listing has to satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformLimits {
    /// Maximum title length in chars
    pub max_title_len: usize,
    /// Maximum number of tags
    pub max_tags: usize,
    /// Maximum length of a single tag in chars
    pub max_tag_len: usize,
    /// Leading description span that must carry the keywords
    pub description_keyword_window: usize,
}

impl PlatformLimits {
    pub const MAX_TITLE_LEN: usize = 140;
    pub const MAX_TAGS: usize = 13;
    pub const MAX_TAG_LEN: usize = 20;
    pub const DESCRIPTION_KEYWORD_WINDOW: usize = 160;
}

impl Default for PlatformLimits {
    fn default() -> Self {
        Self {
            max_title_len: Self::MAX_TITLE_LEN,
            max_tags: Self::MAX_TAGS,
            max_tag_len: Self::MAX_TAG_LEN,
            description_keyword_window: Self::DESCRIPTION_KEYWORD_WINDOW,
        }
    }
}

/// Keywords a catalog is optimized for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPolicy {
    /// Phrase that leads every title and is present in every tag set
    pub primary: String,
    /// Supporting phrases for description intros, in priority order
    #[serde(default)]
    pub secondary: Vec<String>,
    /// Weak single-word tag -> replacement phrase
    #[serde(default)]
    pub weak_tags: BTreeMap<String, String>,
    /// Tags added after the primary while the tag list has room
    #[serde(default)]
    pub core_tags: Vec<String>,
    /// Lead-in sentence with `{primary}` and `{secondary}` placeholders
    #[serde(default = "default_lead_in_template")]
    pub lead_in_template: String,
    /// Drop leading emoji/ruler lines from descriptions before checking them
    #[serde(default)]
    pub strip_decorative_lead: bool,
}

fn default_lead_in_template() -> String {
    DEFAULT_LEAD_IN_TEMPLATE.to_string()
}

impl KeywordPolicy {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: vec![],
            weak_tags: BTreeMap::new(),
            core_tags: vec![],
            lead_in_template: default_lead_in_template(),
            strip_decorative_lead: false,
        }
    }

    pub fn with_secondary<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary = phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weak_tag(mut self, word: impl Into<String>, phrase: impl Into<String>) -> Self {
        self.weak_tags.insert(word.into(), phrase.into());
        self
    }

    pub fn with_core_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.core_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Primary phrase with whitespace collapsed
    pub fn primary_phrase(&self) -> String {
        self.primary.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Replacement phrase for a weak tag, matched case-insensitively
    pub fn weak_tag_phrase(&self, tag: &str) -> Option<&str> {
        let wanted = tag.trim().to_lowercase();
        self.weak_tags
            .iter()
            .find(|(word, _)| word.trim().to_lowercase() == wanted)
            .map(|(_, phrase)| phrase.as_str())
    }

    /// Check the policy against limits it must always satisfy
    pub fn validate(&self, limits: &PlatformLimits) -> Result<(), ConfigurationError> {
        if limits.max_title_len == 0
            || limits.max_tags == 0
            || limits.max_tag_len == 0
            || limits.description_keyword_window == 0
        {
            return Err(ConfigurationError::ZeroLimit);
        }

        let primary = self.primary_phrase();
        if primary.is_empty() {
            return Err(ConfigurationError::EmptyPrimary);
        }

        let len = char_len(&primary);
        let checks = [
            ("tag length", limits.max_tag_len),
            ("title length", limits.max_title_len),
            ("description keyword window", limits.description_keyword_window),
        ];
        for (limit_name, max) in checks {
            if len > max {
                return Err(ConfigurationError::PrimaryTooLong {
                    primary,
                    len,
                    limit_name,
                    max,
                });
            }
        }

        if let Some(index) = self.secondary.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigurationError::EmptySecondary { index });
        }

        if let Some(word) = self.weak_tags.keys().find(|w| !is_single_word(w)) {
            return Err(ConfigurationError::WeakTagNotSingleWord { word: word.clone() });
        }

        if let Some((word, _)) = self.weak_tags.iter().find(|(_, p)| p.trim().is_empty()) {
            return Err(ConfigurationError::EmptyWeakTagPhrase { word: word.clone() });
        }

        // A replacement that is itself a weak word would be expanded again
        // on the next run
        for (word, phrase) in &self.weak_tags {
            let fitted = truncate_at_word(phrase.trim(), limits.max_tag_len);
            let is_other_word = fitted.to_lowercase() != word.trim().to_lowercase();
            if is_single_word(&fitted) && is_other_word && self.weak_tag_phrase(&fitted).is_some() {
                return Err(ConfigurationError::ChainedWeakTag {
                    word: word.clone(),
                    phrase: phrase.clone(),
                });
            }
        }

        for (index, tag) in self.core_tags.iter().enumerate() {
            let tag = tag.split_whitespace().collect::<Vec<_>>().join(" ");
            if tag.is_empty() {
                return Err(ConfigurationError::EmptyCoreTag { index });
            }
            let len = char_len(&tag);
            if len > limits.max_tag_len {
                return Err(ConfigurationError::CoreTagTooLong {
                    tag,
                    len,
                    max: limits.max_tag_len,
                });
            }
            if is_single_word(&tag) && self.weak_tag_phrase(&tag).is_some() {
                return Err(ConfigurationError::CoreTagIsWeak { tag });
            }
        }

        if !self.lead_in_template.contains(PRIMARY_PLACEHOLDER) {
            return Err(ConfigurationError::TemplateMissingPrimary {
                template: self.lead_in_template.clone(),
            });
        }

        Ok(())
    }

    /// Deterministic hash of the policy and limits, so a report can be
    /// traced back to the configuration that produced it
    pub fn fingerprint(&self, limits: &PlatformLimits) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.primary.as_bytes());
        for phrase in &self.secondary {
            hasher.update([0u8]);
            hasher.update(phrase.as_bytes());
        }
        for (word, phrase) in &self.weak_tags {
            hasher.update([1u8]);
            hasher.update(word.as_bytes());
            hasher.update([2u8]);
            hasher.update(phrase.as_bytes());
        }
        for tag in &self.core_tags {
            hasher.update([4u8]);
            hasher.update(tag.as_bytes());
        }
        hasher.update([3u8]);
        hasher.update(self.lead_in_template.as_bytes());
        hasher.update([u8::from(self.strip_decorative_lead)]);
        for limit in [
            limits.max_title_len,
            limits.max_tags,
            limits.max_tag_len,
            limits.description_keyword_window,
        ] {
            hasher.update((limit as u64).to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Policy problems that make a run impossible
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Primary keyword phrase is empty")]
    EmptyPrimary,
    #[error("Primary keyword '{primary}' is {len} chars, exceeds {limit_name} limit of {max}")]
    PrimaryTooLong {
        primary: String,
        len: usize,
        limit_name: &'static str,
        max: usize,
    },
    #[error("Platform limits must all be greater than zero")]
    ZeroLimit,
    #[error("Secondary phrase #{index} is empty")]
    EmptySecondary { index: usize },
    #[error("Weak tag '{word}' must be a single word")]
    WeakTagNotSingleWord { word: String },
    #[error("Weak tag '{word}' has an empty replacement phrase")]
    EmptyWeakTagPhrase { word: String },
    #[error("Weak tag '{word}' expands to '{phrase}', which is itself a weak tag")]
    ChainedWeakTag { word: String, phrase: String },
    #[error("Core tag #{index} is empty")]
    EmptyCoreTag { index: usize },
    #[error("Core tag '{tag}' is {len} chars, exceeds tag length limit of {max}")]
    CoreTagTooLong { tag: String, len: usize, max: usize },
    #[error("Core tag '{tag}' is a weak tag")]
    CoreTagIsWeak { tag: String },
    #[error("Lead-in template '{template}' does not contain {{primary}}")]
    TemplateMissingPrimary { template: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> KeywordPolicy {
        KeywordPolicy::new("Clay Earrings")
            .with_secondary(["Gift for Her", "Handmade in Poland"])
            .with_weak_tag("cute", "Cute Polymer Clay")
            .with_core_tags(["handmade earrings"])
    }

    #[test]
    fn test_default_limits_match_platform() {
        let limits = PlatformLimits::default();
        assert_eq!(limits.max_title_len, 140);
        assert_eq!(limits.max_tags, 13);
        assert_eq!(limits.max_tag_len, 20);
        assert_eq!(limits.description_keyword_window, 160);
    }

    #[test]
    fn test_valid_policy_passes() {
        assert!(sample_policy().validate(&PlatformLimits::default()).is_ok());
    }

    #[test]
    fn test_primary_longer_than_tag_limit_is_rejected() {
        let policy = KeywordPolicy::new("Polymer Clay Earrings");
        assert!(matches!(
            policy.validate(&PlatformLimits::default()),
            Err(ConfigurationError::PrimaryTooLong {
                limit_name: "tag length",
                len: 21,
                max: 20,
                ..
            })
        ));
    }

    #[test]
    fn test_primary_longer_than_title_limit_is_rejected() {
        let limits = PlatformLimits {
            max_title_len: 10,
            ..Default::default()
        };
        let result = sample_policy().validate(&limits);

        assert!(matches!(
            result,
            Err(ConfigurationError::PrimaryTooLong {
                limit_name: "title length",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_primary_is_rejected() {
        let result = KeywordPolicy::new("   ").validate(&PlatformLimits::default());
        assert_eq!(result, Err(ConfigurationError::EmptyPrimary));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let limits = PlatformLimits {
            max_tags: 0,
            ..Default::default()
        };
        assert_eq!(
            sample_policy().validate(&limits),
            Err(ConfigurationError::ZeroLimit)
        );
    }

    #[test]
    fn test_multi_word_weak_tag_is_rejected() {
        let policy = sample_policy().with_weak_tag("boho chic", "boho style");
        assert!(matches!(
            policy.validate(&PlatformLimits::default()),
            Err(ConfigurationError::WeakTagNotSingleWord { .. })
        ));
    }

    #[test]
    fn test_chained_weak_tags_are_rejected() {
        let policy = sample_policy()
            .with_weak_tag("boho", "vintage")
            .with_weak_tag("vintage", "vintage style");
        assert!(matches!(
            policy.validate(&PlatformLimits::default()),
            Err(ConfigurationError::ChainedWeakTag { ref word, .. }) if word == "boho"
        ));
    }

    #[test]
    fn test_weak_tag_chained_through_truncation_is_rejected() {
        let policy = sample_policy()
            .with_weak_tag("boho", "vintage supercalifragilistic")
            .with_weak_tag("vintage", "vintage style");
        assert!(matches!(
            policy.validate(&PlatformLimits::default()),
            Err(ConfigurationError::ChainedWeakTag { .. })
        ));
    }

    #[test]
    fn test_weak_tag_expanding_to_itself_is_accepted() {
        let policy = sample_policy().with_weak_tag("hypoallergenic", "hypoallergenic earrings");
        assert!(policy.validate(&PlatformLimits::default()).is_ok());
    }

    #[test]
    fn test_core_tag_longer_than_tag_limit_is_rejected() {
        let policy = sample_policy().with_core_tags(["handmade polymer clay jewelry"]);
        assert!(matches!(
            policy.validate(&PlatformLimits::default()),
            Err(ConfigurationError::CoreTagTooLong { len: 29, max: 20, .. })
        ));
    }

    #[test]
    fn test_empty_or_weak_core_tags_are_rejected() {
        let limits = PlatformLimits::default();
        assert_eq!(
            sample_policy().with_core_tags(["gift", "  "]).validate(&limits),
            Err(ConfigurationError::EmptyCoreTag { index: 1 })
        );
        assert!(matches!(
            sample_policy().with_core_tags(["Cute"]).validate(&limits),
            Err(ConfigurationError::CoreTagIsWeak { .. })
        ));
    }

    #[test]
    fn test_template_without_primary_is_rejected() {
        let mut policy = sample_policy();
        policy.lead_in_template = "Shop {secondary} today.".to_string();
        assert!(matches!(
            policy.validate(&PlatformLimits::default()),
            Err(ConfigurationError::TemplateMissingPrimary { .. })
        ));
    }

    #[test]
    fn test_weak_tag_lookup_ignores_case() {
        let policy = sample_policy();
        assert_eq!(policy.weak_tag_phrase("CUTE"), Some("Cute Polymer Clay"));
        assert_eq!(policy.weak_tag_phrase("gift"), None);
    }

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        let limits = PlatformLimits::default();
        let a = sample_policy().fingerprint(&limits);
        let b = sample_policy().fingerprint(&limits);
        let c = sample_policy()
            .with_weak_tag("boho", "boho style")
            .fingerprint(&limits);
        let d = sample_policy().fingerprint(&PlatformLimits {
            max_tags: 10,
            ..limits
        });
        let e = sample_policy()
            .with_core_tags(["gift for her"])
            .fingerprint(&limits);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(a, e);
        assert_eq!(a.len(), 64);
    }
}
