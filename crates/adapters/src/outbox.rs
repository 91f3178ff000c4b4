//! Change outbox: one JSON line per change entry, for review before apply.

use listing_seo_domain::model::{ChangeEntry, SkippedRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct OutboxWriter {
    path: PathBuf,
    file: Arc<Mutex<tokio::fs::File>>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutboxEntry<'a> {
    Change(&'a ChangeEntry),
    Skipped(&'a SkippedRecord),
}

impl OutboxWriter {
    pub async fn new(path: PathBuf) -> Result<Self, OutboxError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append every change and skipped record; returns the number of lines
    pub async fn append_batch<'a>(
        &self,
        changes: impl IntoIterator<Item = &'a ChangeEntry>,
        skipped: &'a [SkippedRecord],
    ) -> Result<usize, OutboxError> {
        let mut lines = String::new();
        let mut count = 0;
        let entries = changes
            .into_iter()
            .map(OutboxEntry::Change)
            .chain(skipped.iter().map(OutboxEntry::Skipped));
        for entry in entries {
            lines.push_str(&serde_json::to_string(&entry)?);
            lines.push('\n');
            count += 1;
        }

        let mut file = self.file.lock().await;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(count)
    }
}
