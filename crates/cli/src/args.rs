//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// listing-seo: rewrite marketplace listings around a keyword policy
#[derive(Parser, Debug)]
#[command(name = "listing-seo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite a CSV catalog and write a change report
    Rewrite(RewriteArgs),

    /// One-shot rewrite of a single listing
    Preview(PreviewArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Write corrected catalog files (default is preview: report only)
    #[arg(long)]
    pub apply: bool,

    /// Override the listings table path
    #[arg(long)]
    pub listings: Option<PathBuf>,

    /// Override the tags table path
    #[arg(long)]
    pub tags: Option<PathBuf>,

    /// Override the report path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also append every change to this JSONL file
    #[arg(long)]
    pub outbox: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Listing title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Listing description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Listing identifier shown in the output
    #[arg(long, default_value = "preview")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file plus environment) as TOML
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
