//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// A single marketplace listing as exported from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Listing ID or SKU, unique within a batch
    pub id: String,
    /// Listing title
    pub title: String,
    /// Full listing description
    pub description: String,
    /// Tags in display order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ListingRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            tags,
        }
    }
}

/// A listing field that the engine may rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
    Tags,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Tags => "tags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a field before or after a rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Tags(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Tags(tags) => f.write_str(&tags.join(", ")),
        }
    }
}

/// One field-level change made to a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub listing_id: String,
    pub field: Field,
    pub before: FieldValue,
    pub after: FieldValue,
}

/// Corrected listing plus the changes that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub record: ListingRecord,
    pub changes: Vec<ChangeEntry>,
}

impl RewriteResult {
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Why a record was left out of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Identifier is empty or whitespace
    MissingIdentifier,
    /// Identifier already seen earlier in the batch
    DuplicateIdentifier,
}

impl SkipReason {
    /// Stable reason code used in reports and logs
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::MissingIdentifier => "missing_identifier",
            SkipReason::DuplicateIdentifier => "duplicate_identifier",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A malformed record isolated from the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Zero-based position in the input sequence
    pub position: usize,
    /// Identifier as supplied, if any
    pub listing_id: Option<String>,
    pub reason: SkipReason,
}

/// Result of rewriting a batch of listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOutcome {
    /// One result per accepted record, in input order
    pub results: Vec<RewriteResult>,
    /// Records rejected as malformed
    pub skipped: Vec<SkippedRecord>,
}

impl RewriteOutcome {
    /// Corrected records in input order
    pub fn records(&self) -> impl Iterator<Item = &ListingRecord> {
        self.results.iter().map(|r| &r.record)
    }

    /// All change entries across the batch, grouped by record
    pub fn changes(&self) -> impl Iterator<Item = &ChangeEntry> {
        self.results.iter().flat_map(|r| r.changes.iter())
    }

    /// Number of records with at least one change
    pub fn changed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_changed()).count()
    }
}

/// Whether a sink may touch its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Describe what would be written without writing it
    #[default]
    Preview,
    /// Write corrected records to the destination
    Apply,
}

impl WriteMode {
    pub fn from_apply_flag(apply: bool) -> Self {
        if apply { Self::Apply } else { Self::Preview }
    }

    pub fn is_apply(&self) -> bool {
        matches!(self, Self::Apply)
    }
}

/// What a sink did with a batch of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub mode: WriteMode,
    /// Records actually written to the destination
    pub written: usize,
    /// Human-readable destination (file paths, etc.)
    pub destination: String,
}

/// Everything produced by a batch run, ready for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    /// Fingerprint of the policy and limits used
    pub policy_fingerprint: String,
    pub outcome: RewriteOutcome,
    pub write: Option<WriteSummary>,
}
