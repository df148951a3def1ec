//! Error types shared across the capture-recapture workspace.
//!
//! Every error carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - A remediation hint for humans
//!
//! Errors serialize to structured JSON at the CLI boundary:
//! ```json
//! {
//!   "code": 31,
//!   "category": "inference",
//!   "message": "degenerate posterior: ...",
//!   "remediation": "Widen the grid ..."
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Analysis configuration errors (grid, prior, model, coverage).
    Config,
    /// Posterior update and interval extraction errors.
    Inference,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid prior: {0}")]
    InvalidPrior(String),

    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    // Inference errors (30-39)
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("degenerate posterior: {0}")]
    DegeneratePosterior(String),

    #[error("coverage {target} unattainable (best attained {best:.6})")]
    CoverageUnattainable { target: f64, best: f64 },

    #[error("grid too short for an interval: {len} point(s)")]
    InsufficientGrid { len: usize },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 30-39: Inference errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidGrid(_) => 11,
            Error::InvalidPrior(_) => 12,
            Error::InvalidObservation(_) => 13,
            Error::Inference(_) => 30,
            Error::DegeneratePosterior(_) => 31,
            Error::CoverageUnattainable { .. } => 32,
            Error::InsufficientGrid { .. } => 33,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::InvalidGrid(_)
            | Error::InvalidPrior(_)
            | Error::InvalidObservation(_) => ErrorCategory::Config,

            Error::Inference(_)
            | Error::DegeneratePosterior(_)
            | Error::CoverageUnattainable { .. }
            | Error::InsufficientGrid { .. } => ErrorCategory::Inference,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Run 'cr-core check' to validate the analysis file.",
            Error::InvalidGrid(_) => {
                "Grid values must be finite and strictly increasing with at least two points."
            }
            Error::InvalidPrior(_) => {
                "Prior weights must be non-negative and match the grid length."
            }
            Error::InvalidObservation(_) => {
                "Check that recaptured counts do not exceed sample sizes or marked totals."
            }
            Error::Inference(_) => "Re-run with -v for detailed inference logs.",
            Error::DegeneratePosterior(_) => {
                "All prior mass lies outside the likelihood support. Widen the grid or the prior window."
            }
            Error::CoverageUnattainable { .. } => {
                "Lower the coverage level or extend the grid so the posterior tail is not truncated."
            }
            Error::InsufficientGrid { .. } => "Use a grid with at least two points.",
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq .' before retrying.",
        }
    }

    /// Structured JSON representation for machine consumers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "category": self.category(),
            "message": self.to_string(),
            "remediation": self.remediation(),
        })
    }
}
