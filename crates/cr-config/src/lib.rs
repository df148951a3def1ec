//! Capture-recapture analysis configuration.
//!
//! This crate provides:
//! - Typed Rust structs for analysis.json
//! - Config resolution (CLI → env → XDG → preset)
//! - Semantic validation
//! - Built-in presets
//! - Config snapshots for reports

pub mod analysis;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use analysis::{
    resolve_marked, AnalysisConfig, GridSpec, ModelSpec, PriorSpec, StageSpec, TwoTestCounts,
};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::{ConfigSnapshot, ConfigSummary};
pub use validate::{validate_analysis, ValidationError, ValidationResult};

/// Largest grid an analysis file may describe.
///
/// Interval search is quadratic in grid length, so this also bounds run time.
pub const MAX_GRID_POINTS: usize = 100_000;

/// Schema version for analysis files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
