//! Rewrite engine - applies every normalizer to a batch of listings

use std::collections::HashSet;

use crate::{
    model::{ListingRecord, RewriteOutcome, RewriteResult, SkipReason, SkippedRecord},
    policy::{ConfigurationError, KeywordPolicy, PlatformLimits},
    usecases::{
        description::normalize_description, report::diff_record, tags::optimize_tags,
        title::normalize_title,
    },
};

/// Validated policy plus limits; the only way to rewrite listings
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    policy: KeywordPolicy,
    limits: PlatformLimits,
}

impl RewriteEngine {
    /// Validate the policy once, before any record is touched
    pub fn new(policy: KeywordPolicy, limits: PlatformLimits) -> Result<Self, ConfigurationError> {
        policy.validate(&limits)?;
        Ok(Self { policy, limits })
    }

    pub fn policy(&self) -> &KeywordPolicy {
        &self.policy
    }

    pub fn limits(&self) -> &PlatformLimits {
        &self.limits
    }

    pub fn fingerprint(&self) -> String {
        self.policy.fingerprint(&self.limits)
    }

    /// Rewrite a single listing, regardless of its identifier
    pub fn rewrite_record(&self, record: &ListingRecord) -> RewriteResult {
        let transformed = ListingRecord {
            id: record.id.clone(),
            title: normalize_title(&record.title, &self.policy, &self.limits),
            description: normalize_description(&record.description, &self.policy, &self.limits),
            tags: optimize_tags(&record.tags, &self.policy, &self.limits),
        };
        let changes = diff_record(record, &transformed);

        RewriteResult {
            record: transformed,
            changes,
        }
    }

    /// Rewrite a batch. Malformed records are skipped and listed in the
    /// outcome; they never abort the batch.
    pub fn rewrite(&self, records: &[ListingRecord]) -> RewriteOutcome {
        let mut outcome = RewriteOutcome::default();
        let mut seen_ids = HashSet::new();

        for (position, record) in records.iter().enumerate() {
            let id = record.id.trim();
            let reason = if id.is_empty() {
                Some(SkipReason::MissingIdentifier)
            } else if !seen_ids.insert(id) {
                Some(SkipReason::DuplicateIdentifier)
            } else {
                None
            };

            if let Some(reason) = reason {
                tracing::warn!(
                    position,
                    listing_id = %record.id,
                    reason = %reason,
                    "Skipping malformed record"
                );
                outcome.skipped.push(SkippedRecord {
                    position,
                    listing_id: (!id.is_empty()).then(|| record.id.clone()),
                    reason,
                });
                continue;
            }

            let result = self.rewrite_record(record);
            tracing::debug!(
                listing_id = %record.id,
                changes = result.changes.len(),
                "Rewrote listing"
            );
            outcome.results.push(result);
        }

        tracing::info!(
            processed = outcome.results.len(),
            changed = outcome.changed_count(),
            skipped = outcome.skipped.len(),
            "Rewrite finished"
        );

        outcome
    }
}

/// Validate `policy` and rewrite `records` in one call
pub fn rewrite(
    records: &[ListingRecord],
    policy: &KeywordPolicy,
    limits: &PlatformLimits,
) -> Result<RewriteOutcome, ConfigurationError> {
    let engine = RewriteEngine::new(policy.clone(), *limits)?;
    Ok(engine.rewrite(records))
}
