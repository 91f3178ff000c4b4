//! Rewrite command - run the engine over the CSV catalog

use anyhow::{Context, Result};
use listing_seo_adapters::catalog::CsvCatalog;
use listing_seo_adapters::outbox::OutboxWriter;
use listing_seo_adapters::report::MarkdownReportWriter;
use listing_seo_domain::usecases::{RenderConfig, ReportRenderer, RewriteBatch};
use listing_seo_domain::{RewriteEngine, SystemClock, WriteMode};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RewriteArgs;
use crate::config::AppConfig;

pub async fn execute(args: RewriteArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    // Policy errors are fatal before any record is read
    let engine = RewriteEngine::new(config.policy.to_policy(), config.limits)
        .context("Invalid keyword policy")?;

    let mut catalog_config = config.catalog.to_csv_config()?;
    if let Some(listings) = args.listings {
        catalog_config.listings_path = listings;
    }
    if let Some(tags) = args.tags {
        catalog_config.tags_path = Some(tags);
    }
    let catalog = Arc::new(CsvCatalog::new(catalog_config));

    let mode = WriteMode::from_apply_flag(args.apply || !config.general.dry_run);

    tracing::info!(
        mode = ?mode,
        fingerprint = %engine.fingerprint(),
        "Starting rewrite"
    );

    let batch = RewriteBatch::new(
        Arc::clone(&catalog),
        catalog,
        Arc::new(SystemClock),
        engine,
    );
    let report = batch.run(mode).await.context("Rewrite failed")?;

    let renderer = ReportRenderer::new(RenderConfig {
        max_value_chars: config.general.report_max_value_chars,
        list_unchanged: config.general.report_list_unchanged,
        ..RenderConfig::default()
    });
    let report_path = args.report.unwrap_or(config.general.report_path);
    let report_writer = MarkdownReportWriter::new(report_path);
    report_writer
        .write(&renderer.render(&report))
        .await
        .context("Failed to write report")?;

    if let Some(outbox_path) = args.outbox.or(config.general.outbox_path) {
        let outbox = OutboxWriter::new(outbox_path)
            .await
            .context("Failed to open outbox")?;
        let lines = outbox
            .append_batch(report.outcome.changes(), &report.outcome.skipped)
            .await
            .context("Failed to write outbox")?;
        tracing::info!(path = %outbox.path().display(), lines, "Appended to outbox");
    }

    let outcome = &report.outcome;
    println!(
        "Processed {} record(s): {} changed, {} unchanged, {} skipped",
        outcome.results.len(),
        outcome.changed_count(),
        outcome.results.len() - outcome.changed_count(),
        outcome.skipped.len()
    );
    println!("Report: {}", report_writer.path().display());
    match &report.write {
        Some(write) if write.mode.is_apply() => {
            println!("Wrote {} record(s) to {}", write.written, write.destination);
        }
        _ => println!("Preview only, catalog files not written. Use --apply to write them."),
    }

    Ok(())
}
