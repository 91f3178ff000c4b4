//! listing-seo domain crate
//!
//! This crate contains the SEO rewrite engine following hexagonal architecture:
//! - `model`: Listing records, change entries and batch outcomes
//! - `policy`: Keyword policy and platform limits
//! - `ports`: Trait definitions for catalog sources, sinks and the clock
//! - `usecases`: Normalizers, change reporter, rewrite engine, batch run
//! - `text`: Char-aware string helpers shared by the normalizers

pub mod model;
pub mod policy;
pub mod ports;
pub mod text;
pub mod usecases;

pub use model::*;
pub use policy::{ConfigurationError, KeywordPolicy, PlatformLimits};
pub use ports::*;
pub use usecases::{RewriteEngine, rewrite};
