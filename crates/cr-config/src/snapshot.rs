//! Configuration snapshots for reproducible reports.
//!
//! A snapshot pins the exact analysis that produced a report: its source,
//! a content hash, and the handful of values a reader checks first.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::{AnalysisConfig, ModelSpec};
use crate::resolve::{ConfigPaths, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the analysis was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the analysis configuration.
    pub source: String,

    /// Preset name when no file was used.
    #[serde(default)]
    pub preset: Option<String>,

    /// SHA-256 of the canonical JSON serialization.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSummary {
    pub model: String,
    pub grid_points: usize,
    pub grid_min: f64,
    pub grid_max: f64,
    pub stages: usize,
    pub coverage: f64,
}

impl ConfigSnapshot {
    /// Snapshot a loaded configuration.
    pub fn new(config: &AnalysisConfig, paths: &ConfigPaths, preset: Option<&str>) -> Self {
        let canonical = serde_json::to_string(config).unwrap_or_default();
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            path: paths.analysis.as_ref().map(|p| p.display().to_string()),
            source: paths.source.to_string(),
            preset: match paths.source {
                ConfigSource::Preset => preset.map(str::to_string),
                _ => None,
            },
            config_hash: hash_content(&canonical),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

impl ConfigSummary {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let grid = config.grid.values();
        let stages = match &config.model {
            ModelSpec::Hypergeometric { stages } => stages.len(),
            ModelSpec::TwoTest { .. } => 1,
        };
        ConfigSummary {
            model: config.model.kind().to_string(),
            grid_points: grid.len(),
            grid_min: grid.first().copied().unwrap_or(f64::NAN),
            grid_max: grid.last().copied().unwrap_or(f64::NAN),
            stages,
            coverage: config.coverage,
        }
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{get_preset, PresetName};

    #[test]
    fn preset_snapshot_records_name() {
        let config = get_preset(PresetName::TwoStage);
        let snapshot = ConfigSnapshot::new(&config, &ConfigPaths::default(), Some("two-stage"));
        assert_eq!(snapshot.preset.as_deref(), Some("two-stage"));
        assert_eq!(snapshot.source, "builtin preset");
        assert_eq!(snapshot.summary.stages, 2);
        assert_eq!(snapshot.summary.grid_points, 200);
        assert_eq!(snapshot.summary.grid_max, 200.0);
    }

    #[test]
    fn same_config_same_hash() {
        let a = ConfigSnapshot::new(
            &get_preset(PresetName::TwoTest),
            &ConfigPaths::default(),
            None,
        );
        let b = ConfigSnapshot::new(
            &get_preset(PresetName::TwoTest),
            &ConfigPaths::default(),
            None,
        );
        assert!(a.matches(&b));
        assert_eq!(a.short_id().len(), 12);
    }

    #[test]
    fn different_config_different_hash() {
        let a = ConfigSnapshot::new(
            &get_preset(PresetName::TwoTest),
            &ConfigPaths::default(),
            None,
        );
        let b = ConfigSnapshot::new(
            &get_preset(PresetName::TwoStage),
            &ConfigPaths::default(),
            None,
        );
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_hash_content() {
        let hash = hash_content("test");
        assert_eq!(hash, hash_content("test"));
        assert_eq!(hash.len(), 64);
    }
}
