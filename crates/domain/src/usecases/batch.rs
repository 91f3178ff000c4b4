//! Batch use case - load, rewrite, hand off, report

use std::sync::Arc;

use crate::{
    model::{BatchReport, WriteMode},
    ports::{CatalogError, CatalogSink, CatalogSource, Clock},
    usecases::engine::RewriteEngine,
};

/// Errors that stop a batch run
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to load catalog from {source_name}: {error}")]
    Load {
        source_name: String,
        #[source]
        error: CatalogError,
    },
    #[error("Failed to write corrected records: {0}")]
    Write(#[source] CatalogError),
}

/// Runs the engine between a catalog source and a sink
pub struct RewriteBatch<S, K, Cl>
where
    S: CatalogSource + ?Sized,
    K: CatalogSink + ?Sized,
    Cl: Clock + ?Sized,
{
    source: Arc<S>,
    sink: Arc<K>,
    clock: Arc<Cl>,
    engine: RewriteEngine,
}

impl<S, K, Cl> RewriteBatch<S, K, Cl>
where
    S: CatalogSource + ?Sized,
    K: CatalogSink + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(source: Arc<S>, sink: Arc<K>, clock: Arc<Cl>, engine: RewriteEngine) -> Self {
        Self {
            source,
            sink,
            clock,
            engine,
        }
    }

    /// Load all records, rewrite them, and pass the results to the sink
    /// with the given write mode
    pub async fn run(&self, mode: WriteMode) -> Result<BatchReport, BatchError> {
        let source_name = self.source.describe();
        let records = self.source.load().await.map_err(|error| BatchError::Load {
            source_name: source_name.clone(),
            error,
        })?;

        tracing::info!(
            source = %source_name,
            records = records.len(),
            mode = ?mode,
            "Loaded catalog"
        );

        let outcome = self.engine.rewrite(&records);

        let write = self
            .sink
            .write(&outcome.results, mode)
            .await
            .map_err(BatchError::Write)?;

        tracing::info!(
            mode = ?write.mode,
            written = write.written,
            destination = %write.destination,
            "Handed off corrected records"
        );

        Ok(BatchReport {
            generated_at: self.clock.now(),
            policy_fingerprint: self.engine.fingerprint(),
            outcome,
            write: Some(write),
        })
    }
}
