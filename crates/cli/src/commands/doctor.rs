//! Doctor command - validate configuration and show status

use anyhow::Result;
use listing_seo_domain::RewriteEngine;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    policy: CheckResult,
    listings: CheckResult,
    tags: CheckResult,
    outputs: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        policy: CheckResult::error("Not checked"),
        listings: CheckResult::error("Not checked"),
        tags: CheckResult::error("Not checked"),
        outputs: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.policy = check_policy(config);
        report.listings = check_listings(config);
        report.tags = check_tags(config);
        report.outputs = check_outputs(config);
    }

    // Determine overall status
    let checks = [
        &report.config,
        &report.policy,
        &report.listings,
        &report.tags,
        &report.outputs,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_policy(config: &AppConfig) -> CheckResult {
    match RewriteEngine::new(config.policy.to_policy(), config.limits) {
        Ok(engine) => {
            let policy = engine.policy();
            CheckResult::ok(format!(
                "Primary: '{}', {} secondary phrase(s), {} weak tag(s), {} core tag(s)",
                policy.primary,
                policy.secondary.len(),
                policy.weak_tags.len(),
                policy.core_tags.len()
            ))
            .with_details(serde_json::json!({
                "fingerprint": engine.fingerprint(),
                "limits": engine.limits(),
            }))
        }
        Err(e) => CheckResult::error(format!("Invalid policy: {}", e)),
    }
}

fn check_listings(config: &AppConfig) -> CheckResult {
    if let Err(e) = config.catalog.to_csv_config() {
        return CheckResult::error(e.to_string());
    }

    let path = &config.catalog.listings_path;
    if path.is_file() {
        CheckResult::ok(format!("Listings table: {}", path.display()))
    } else {
        CheckResult::error(format!("Listings table not found: {}", path.display()))
    }
}

fn check_tags(config: &AppConfig) -> CheckResult {
    match &config.catalog.tags_path {
        None => CheckResult::warn("No tags table configured, listings will start with no tags"),
        Some(path) if path.is_file() => {
            CheckResult::ok(format!("Tags table: {}", path.display()))
        }
        Some(path) => CheckResult::error(format!("Tags table not found: {}", path.display())),
    }
}

fn check_outputs(config: &AppConfig) -> CheckResult {
    let outputs = [
        &config.catalog.listings_output,
        &config.catalog.tags_output,
        &config.general.report_path,
    ];

    let inputs: Vec<&Path> = std::iter::once(config.catalog.listings_path.as_path())
        .chain(config.catalog.tags_path.as_deref())
        .collect();
    if let Some(clash) = outputs.iter().find(|o| inputs.contains(&o.as_path())) {
        return CheckResult::error(format!(
            "Output would overwrite an input table: {}",
            clash.display()
        ));
    }

    let mode = if config.general.dry_run {
        "preview (dry_run = true)"
    } else {
        "apply (dry_run = false)"
    };
    CheckResult::ok(format!(
        "Mode: {}, report: {}",
        mode,
        config.general.report_path.display()
    ))
}

fn print_report(report: &DoctorReport) {
    println!("listing-seo Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("Policy", &report.policy);
    print_check("Listings", &report.listings);
    print_check("Tags", &report.tags);
    print_check("Outputs", &report.outputs);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall != "error" {
        println!();
        println!("Ready to run! Try: listing-seo rewrite");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
