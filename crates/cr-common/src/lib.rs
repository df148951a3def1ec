//! Capture-recapture common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Workspace-wide error type with stable codes
//! - Output format specifications

pub mod error;
pub mod output;

pub use error::{Error, ErrorCategory, Result};
pub use output::OutputFormat;

/// Schema version of every JSON payload this workspace emits.
pub const SCHEMA_VERSION: &str = "1.0.0";
