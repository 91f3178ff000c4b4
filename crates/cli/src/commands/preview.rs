//! Preview command - one-shot rewrite of a single listing

use anyhow::{Context, Result};
use listing_seo_domain::{ListingRecord, RewriteEngine};
use std::path::PathBuf;

use crate::args::PreviewArgs;
use crate::config::AppConfig;

pub async fn execute(args: PreviewArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let engine = RewriteEngine::new(config.policy.to_policy(), config.limits)
        .context("Invalid keyword policy")?;

    let tags = args
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let record = ListingRecord::new(args.id, args.title, args.description, tags);

    let result = engine.rewrite_record(&record);

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize output")?;
        println!("{}", json);
        return Ok(());
    }

    println!("Preview");
    println!("=======");
    println!();
    println!("Title: {}", result.record.title);
    println!();
    println!("Description:");
    println!("{}", result.record.description);
    println!();
    println!("Tags:");
    for tag in &result.record.tags {
        println!("  - {}", tag);
    }
    println!();

    if result.changes.is_empty() {
        println!("No changes needed.");
    } else {
        println!("{} field(s) changed.", result.changes.len());
    }

    Ok(())
}
