//! Application use cases / business logic

pub mod batch;
pub mod description;
pub mod engine;
pub mod report;
pub mod tags;
pub mod title;

pub use batch::{BatchError, RewriteBatch};
pub use description::normalize_description;
pub use engine::{RewriteEngine, rewrite};
pub use report::{RenderConfig, ReportRenderer, diff_record};
pub use tags::optimize_tags;
pub use title::normalize_title;
