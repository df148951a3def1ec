//! JSON Schema generation for command payloads and analysis files.
//!
//! ```bash
//! cr-core schema --list
//! cr-core schema AnalysisReport
//! cr-core schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::analysis::{AnalysisReport, StageReport, TwoTestReport};
pub use crate::inference::{Interval, PosteriorSummary};
pub use crate::simulate::SimulationReport;
pub use cr_config::{AnalysisConfig, ConfigSnapshot};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("AnalysisConfig", "Analysis file accepted by run and check"),
        ("AnalysisReport", "Output of cr-core run"),
        ("StageReport", "Posterior summary after one observation"),
        ("TwoTestReport", "Detection-probability marginals of a two-test run"),
        ("PosteriorSummary", "MAP, mean, median, sd and credible interval"),
        ("Interval", "Highest-posterior-density interval"),
        ("SimulationReport", "Output of cr-core simulate"),
        ("ConfigSnapshot", "Provenance of the effective analysis"),
    ]
}

/// Generate JSON Schema for a type by name.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "AnalysisConfig" => schema_for!(AnalysisConfig),
        "AnalysisReport" => schema_for!(AnalysisReport),
        "StageReport" => schema_for!(StageReport),
        "TwoTestReport" => schema_for!(TwoTestReport),
        "PosteriorSummary" => schema_for!(PosteriorSummary),
        "Interval" => schema_for!(Interval),
        "SimulationReport" => schema_for!(SimulationReport),
        "ConfigSnapshot" => schema_for!(ConfigSnapshot),
        _ => return None,
    };
    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}
