//! In-memory catalog for tests and embedding

use async_trait::async_trait;
use listing_seo_domain::{
    CatalogError, CatalogSink, CatalogSource, ListingRecord, RewriteResult, WriteMode,
    WriteSummary,
};
use std::sync::RwLock;

/// Catalog held in memory; `Apply` replaces the stored records
pub struct InMemoryCatalog {
    records: RwLock<Vec<ListingRecord>>,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<ListingRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Current contents
    pub fn records(&self) -> Result<Vec<ListingRecord>, CatalogError> {
        let records = self
            .records
            .read()
            .map_err(|e| CatalogError::Serialization(e.to_string()))?;
        Ok(records.clone())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn load(&self) -> Result<Vec<ListingRecord>, CatalogError> {
        self.records()
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[async_trait]
impl CatalogSink for InMemoryCatalog {
    async fn write(
        &self,
        results: &[RewriteResult],
        mode: WriteMode,
    ) -> Result<WriteSummary, CatalogError> {
        let written = if mode.is_apply() {
            let mut records = self
                .records
                .write()
                .map_err(|e| CatalogError::Serialization(e.to_string()))?;
            *records = results.iter().map(|r| r.record.clone()).collect();
            records.len()
        } else {
            0
        };

        Ok(WriteSummary {
            mode,
            written,
            destination: self.describe(),
        })
    }
}
