//! Change reporting - field diffs and the human-readable report

use time::format_description::well_known::Rfc3339;

use crate::model::{BatchReport, ChangeEntry, Field, FieldValue, ListingRecord, WriteMode};
use crate::text::{char_len, take_chars};

/// Compare two versions of a listing field by field.
///
/// Entries come out in the fixed order title, description, tags. Tags are
/// compared as ordered sequences, so a reorder is a change.
pub fn diff_record(original: &ListingRecord, transformed: &ListingRecord) -> Vec<ChangeEntry> {
    let mut changes = Vec::new();
    let mut push = |field: Field, before: FieldValue, after: FieldValue| {
        changes.push(ChangeEntry {
            listing_id: original.id.clone(),
            field,
            before,
            after,
        });
    };

    if original.title != transformed.title {
        push(
            Field::Title,
            FieldValue::Text(original.title.clone()),
            FieldValue::Text(transformed.title.clone()),
        );
    }
    if original.description != transformed.description {
        push(
            Field::Description,
            FieldValue::Text(original.description.clone()),
            FieldValue::Text(transformed.description.clone()),
        );
    }
    if original.tags != transformed.tags {
        push(
            Field::Tags,
            FieldValue::Tags(original.tags.clone()),
            FieldValue::Tags(transformed.tags.clone()),
        );
    }

    changes
}

/// Configuration for the report renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Report heading
    pub title: String,
    /// Shorten rendered values to this many chars (None = full values)
    pub max_value_chars: Option<usize>,
    /// Include the list of records that needed no changes
    pub list_unchanged: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Listing SEO change report".to_string(),
            max_value_chars: None,
            list_unchanged: false,
        }
    }
}

/// Renders batch reports as markdown
pub struct ReportRenderer {
    config: RenderConfig,
}

impl ReportRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render the whole report. Only reads the report.
    pub fn render(&self, report: &BatchReport) -> String {
        let mut out = String::new();
        let outcome = &report.outcome;

        push_line(&mut out, format!("# {}", self.config.title));
        push_line(&mut out, "");
        let generated = report
            .generated_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| report.generated_at.to_string());
        push_line(&mut out, format!("- Generated: {}", generated));
        push_line(
            &mut out,
            format!("- Policy fingerprint: `{}`", report.policy_fingerprint),
        );
        if let Some(write) = &report.write {
            let mode = match write.mode {
                WriteMode::Preview => "preview (nothing written)",
                WriteMode::Apply => "apply",
            };
            push_line(&mut out, format!("- Mode: {}", mode));
            push_line(&mut out, format!("- Destination: {}", write.destination));
        }
        push_line(&mut out, "");

        let processed = outcome.results.len();
        let changed = outcome.changed_count();
        push_line(&mut out, "## Summary");
        push_line(&mut out, "");
        push_line(&mut out, format!("- Records processed: {}", processed));
        push_line(&mut out, format!("- Records changed: {}", changed));
        push_line(&mut out, format!("- Records unchanged: {}", processed - changed));
        push_line(&mut out, format!("- Field changes: {}", outcome.changes().count()));
        push_line(&mut out, format!("- Records skipped: {}", outcome.skipped.len()));

        out.push_str(&self.render_changes(outcome.changes()));

        if self.config.list_unchanged {
            let unchanged: Vec<_> = outcome
                .results
                .iter()
                .filter(|r| !r.is_changed())
                .map(|r| format!("`{}`", r.record.id))
                .collect();
            if !unchanged.is_empty() {
                push_section(&mut out, "Unchanged records");
                push_line(&mut out, unchanged.join(", "));
            }
        }

        if !outcome.skipped.is_empty() {
            push_section(&mut out, "Skipped records");
            for skipped in &outcome.skipped {
                let id = skipped
                    .listing_id
                    .as_deref()
                    .filter(|id| !id.trim().is_empty())
                    .map(|id| format!("`{}`", id))
                    .unwrap_or_else(|| "(no identifier)".to_string());
                push_line(
                    &mut out,
                    format!(
                        "- Record #{} {}: {}",
                        skipped.position + 1,
                        id,
                        skipped.reason.code()
                    ),
                );
            }
        }

        out
    }

    /// Render change entries grouped by listing, in first-appearance order
    pub fn render_changes<'a>(&self, changes: impl IntoIterator<Item = &'a ChangeEntry>) -> String {
        let mut groups: Vec<(&str, Vec<&ChangeEntry>)> = Vec::new();
        for change in changes {
            match groups.iter_mut().find(|(id, _)| *id == change.listing_id) {
                Some((_, entries)) => entries.push(change),
                None => groups.push((change.listing_id.as_str(), vec![change])),
            }
        }

        let mut out = String::new();
        for (id, entries) in groups {
            push_line(&mut out, "");
            push_line(&mut out, format!("## {}", id));
            for entry in entries {
                push_line(&mut out, "");
                push_line(&mut out, format!("### {}", entry.field));
                push_line(&mut out, "");
                push_line(&mut out, format!("- Before: {}", self.format_value(&entry.before)));
                push_line(&mut out, format!("- After: {}", self.format_value(&entry.after)));
            }
        }
        out
    }

    fn format_value(&self, value: &FieldValue) -> String {
        let text = match value {
            FieldValue::Text(text) if text.is_empty() => return "(empty)".to_string(),
            FieldValue::Tags(tags) if tags.is_empty() => return "(none)".to_string(),
            FieldValue::Text(text) => text.replace('\n', " ⏎ "),
            FieldValue::Tags(tags) => tags
                .iter()
                .map(|t| format!("`{}`", t))
                .collect::<Vec<_>>()
                .join(", "),
        };

        match self.config.max_value_chars {
            Some(max) if char_len(&text) > max => {
                format!("{}...", take_chars(&text, max.saturating_sub(3)))
            }
            _ => text,
        }
    }
}

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

/// Blank line, `## heading`, blank line
fn push_section(out: &mut String, heading: &str) {
    push_line(out, "");
    push_line(out, format!("## {}", heading));
    push_line(out, "");
}
