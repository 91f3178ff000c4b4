//! Filesystem writer for rendered change reports

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Writes rendered markdown reports, replacing any previous report
#[derive(Debug, Clone)]
pub struct MarkdownReportWriter {
    path: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, rendered: &str) -> Result<(), ReportError> {
        let io_error = |source| ReportError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
            }
        }
        tokio::fs::write(&self.path, rendered)
            .await
            .map_err(io_error)?;

        tracing::info!(path = %self.path.display(), bytes = rendered.len(), "Wrote report");
        Ok(())
    }
}
