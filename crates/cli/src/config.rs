//! Configuration loading and management

use anyhow::{Context, Result};
use listing_seo_adapters::catalog::{CsvCatalogConfig, CsvColumns};
use listing_seo_domain::{KeywordPolicy, PlatformLimits, policy::DEFAULT_LEAD_IN_TEMPLATE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub limits: PlatformLimits,

    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Rewrite only reports unless this is false or `--apply` is given
    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    #[serde(default)]
    pub outbox_path: Option<PathBuf>,

    #[serde(default)]
    pub report_max_value_chars: Option<usize>,

    #[serde(default)]
    pub report_list_unchanged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_listings_path")]
    pub listings_path: PathBuf,

    #[serde(default)]
    pub tags_path: Option<PathBuf>,

    #[serde(default = "default_listings_output")]
    pub listings_output: PathBuf,

    #[serde(default = "default_tags_output")]
    pub tags_output: PathBuf,

    /// Single ASCII character
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    #[serde(default = "default_tag_columns")]
    pub tag_columns: usize,

    #[serde(default)]
    pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_id_column")]
    pub id: String,

    #[serde(default = "default_title_column")]
    pub title: String,

    #[serde(default = "default_description_column")]
    pub description: String,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub primary: String,

    #[serde(default)]
    pub secondary: Vec<String>,

    #[serde(default = "default_lead_in_template")]
    pub lead_in_template: String,

    #[serde(default)]
    pub strip_decorative_lead: bool,

    /// Added after the primary keyword while the tag list has room
    #[serde(default)]
    pub core_tags: Vec<String>,

    #[serde(default)]
    pub weak_tags: BTreeMap<String, String>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_report_path() -> PathBuf {
    PathBuf::from("./out/report.md")
}

fn default_listings_path() -> PathBuf {
    PathBuf::from("./listings.csv")
}

fn default_listings_output() -> PathBuf {
    PathBuf::from("./out/listings.csv")
}

fn default_tags_output() -> PathBuf {
    PathBuf::from("./out/tags.csv")
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_tag_columns() -> usize {
    PlatformLimits::MAX_TAGS
}

fn default_id_column() -> String {
    "listing_id".to_string()
}

fn default_title_column() -> String {
    "title".to_string()
}

fn default_description_column() -> String {
    "description".to_string()
}

fn default_tag_prefix() -> String {
    "tag_".to_string()
}

fn default_lead_in_template() -> String {
    DEFAULT_LEAD_IN_TEMPLATE.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: default_true(),
            report_path: default_report_path(),
            outbox_path: None,
            report_max_value_chars: None,
            report_list_unchanged: false,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            listings_path: default_listings_path(),
            tags_path: None,
            listings_output: default_listings_output(),
            tags_output: default_tags_output(),
            delimiter: default_delimiter(),
            tag_columns: default_tag_columns(),
            columns: ColumnsConfig::default(),
        }
    }
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            id: default_id_column(),
            title: default_title_column(),
            description: default_description_column(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            primary: String::new(),
            secondary: vec![],
            lead_in_template: default_lead_in_template(),
            strip_decorative_lead: false,
            core_tags: vec![],
            weak_tags: BTreeMap::new(),
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> KeywordPolicy {
        KeywordPolicy {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            weak_tags: self.weak_tags.clone(),
            core_tags: self.core_tags.clone(),
            lead_in_template: self.lead_in_template.clone(),
            strip_decorative_lead: self.strip_decorative_lead,
        }
    }
}

impl CatalogConfig {
    /// Build the CSV adapter config; the delimiter has to be a single byte
    pub fn to_csv_config(&self) -> Result<CsvCatalogConfig> {
        let delimiter = match self.delimiter.as_bytes() {
            [byte] => *byte,
            _ => anyhow::bail!(
                "Catalog delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ),
        };

        Ok(CsvCatalogConfig {
            listings_path: self.listings_path.clone(),
            tags_path: self.tags_path.clone(),
            listings_output: self.listings_output.clone(),
            tags_output: Some(self.tags_output.clone()),
            delimiter,
            columns: CsvColumns {
                id: self.columns.id.clone(),
                title: self.columns.title.clone(),
                description: self.columns.description.clone(),
                tag_prefix: self.columns.tag_prefix.clone(),
            },
            tag_columns: self.tag_columns,
        })
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("LISTING_SEO")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Log level from the `--log-level` flag, else from `[general]`.
    ///
    /// Runs before logging exists, so a config that fails to load falls
    /// back to the default and the command reports the error itself.
    pub fn log_level(flag: Option<&str>, config_path: Option<&Path>) -> String {
        match flag {
            Some(level) => level.to_string(),
            None => Self::load(config_path)
                .map(|config| config.general.log_level)
                .unwrap_or_else(|_| default_log_level()),
        }
    }

    /// Effective configuration rendered back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# listing-seo configuration

[general]
log_level = "info"
# Rewrite writes only the report unless dry_run = false or --apply is given
dry_run = true
report_path = "./out/report.md"
# outbox_path = "./out/changes.jsonl"
# report_max_value_chars = 200
report_list_unchanged = false

[catalog]
listings_path = "./listings.csv"
tags_path = "./tags.csv"
listings_output = "./out/listings.csv"
tags_output = "./out/tags.csv"
delimiter = ";"
tag_columns = 13

[catalog.columns]
id = "listing_id"
title = "title"
description = "description"
tag_prefix = "tag_"

[limits]
max_title_len = 140
max_tags = 13
max_tag_len = 20
description_keyword_window = 160

[policy]
# Every keyword phrase must fit max_tag_len, since it is also a tag
primary = "Clay Earrings"
secondary = ["Gift for Her", "Handmade Jewelry"]
lead_in_template = "{primary}, {secondary}."
strip_decorative_lead = false
core_tags = ["polymer clay", "handmade earrings"]

[policy.weak_tags]
cute = "Cute Polymer Clay"
"#
        .to_string()
    }
}
