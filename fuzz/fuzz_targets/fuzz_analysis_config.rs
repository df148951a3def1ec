//! Fuzz target for analysis.json parsing and validation.
//!
//! Parsing and validation must reject bad input with an error, never a
//! panic. Oversized grids are refused by the validator before any value
//! is materialized.

#![no_main]

use cr_config::{resolve_marked, validate_analysis, AnalysisConfig, ModelSpec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<AnalysisConfig>(data) else {
        return;
    };
    let _ = config.grid.len();
    match &config.model {
        ModelSpec::Hypergeometric { stages } => {
            let _ = resolve_marked(stages);
        }
        ModelSpec::TwoTest { counts, detection_grid, .. } => {
            let _ = counts.found();
            let _ = detection_grid.len();
        }
    }
    let _ = validate_analysis(&config);
});
