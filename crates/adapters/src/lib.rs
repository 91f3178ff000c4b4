//! listing-seo adapters crate
//!
//! Infrastructure adapters implementing the domain ports:
//! - `catalog`: CSV and in-memory catalog sources/sinks
//! - `report`: markdown report writer
//! - `outbox`: JSONL change log for review

mod catalog_csv;
mod catalog_memory;
pub mod outbox;
mod report_fs;

/// Re-exports for catalog adapters
pub mod catalog {
    pub use crate::catalog_csv::{CsvCatalog, CsvCatalogConfig, CsvColumns};
    pub use crate::catalog_memory::InMemoryCatalog;
}

/// Re-exports for report adapters
pub mod report {
    pub use crate::report_fs::{MarkdownReportWriter, ReportError};
}
