//! Command implementations

pub mod config;
pub mod doctor;
pub mod preview;
pub mod rewrite;
