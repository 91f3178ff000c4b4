//! Port definitions (traits) for external dependencies
//!
//! The rewrite engine itself never performs I/O. These traits define the
//! boundaries to the catalog files and the clock; adapters implement them.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{ListingRecord, RewriteResult, WriteMode, WriteSummary};

/// Error type for catalog source and sink operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for loading listing records
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load every listing, in catalog order
    async fn load(&self) -> Result<Vec<ListingRecord>, CatalogError>;

    /// Human-readable description of where records come from
    fn describe(&self) -> String;
}

/// Port for consuming corrected records.
///
/// `WriteMode::Preview` must leave the destination untouched; only
/// `WriteMode::Apply` may write it.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    async fn write(
        &self,
        results: &[RewriteResult],
        mode: WriteMode,
    ) -> Result<WriteSummary, CatalogError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
