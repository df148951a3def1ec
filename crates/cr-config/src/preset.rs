//! Built-in analyses.
//!
//! Provides ready-made configurations for:
//! - Lincoln–Petersen: one recapture occasion against a known marked count
//! - Two-stage: a mark occasion followed by a recapture occasion
//! - Two-test: two independent detection processes over a 2×2 table

use crate::analysis::{AnalysisConfig, GridSpec, ModelSpec, PriorSpec, StageSpec, TwoTestCounts};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetName {
    /// 14 marked, 12 sampled, 2 recaptured; prior window 2..=199
    LincolnPetersen,
    /// Simulated N=50 history: catches of 14 then 12, 2 recaptured
    TwoStage,
    /// Two detection tests: 10 by test 1 only, 2 by test 2 only, 2 by both
    TwoTest,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::LincolnPetersen,
        PresetName::TwoStage,
        PresetName::TwoTest,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::LincolnPetersen => "lincoln-petersen",
            PresetName::TwoStage => "two-stage",
            PresetName::TwoTest => "two-test",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "lincoln-petersen" | "petersen" | "lp" => Some(PresetName::LincolnPetersen),
            "two-stage" | "sequential" => Some(PresetName::TwoStage),
            "two-test" | "multinomial" | "2x2" => Some(PresetName::TwoTest),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::LincolnPetersen => {
                "Single hypergeometric stage: 14 marked, 12 sampled, 2 recaptured"
            }
            PresetName::TwoStage => {
                "Sequential hypergeometric updates over a simulated N=50 capture history"
            }
            PresetName::TwoTest => {
                "Joint (N, p1, p2) sweep for two independent detection tests"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone)]
pub enum PresetError {
    /// Unknown preset name.
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                write!(
                    f,
                    "Unknown preset '{}'. Available: {}",
                    name,
                    PresetName::ALL
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Listing entry for a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub model: String,
}

/// List every preset with its description.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|p| PresetInfo {
            name: p.as_str().to_string(),
            description: p.description().to_string(),
            model: get_preset(*p).model.kind().to_string(),
        })
        .collect()
}

/// Build the configuration for a preset.
pub fn get_preset(name: PresetName) -> AnalysisConfig {
    match name {
        PresetName::LincolnPetersen => lincoln_petersen(),
        PresetName::TwoStage => two_stage(),
        PresetName::TwoTest => two_test(),
    }
}

fn population_grid() -> GridSpec {
    GridSpec::Integers { start: 1, end: 200 }
}

fn lincoln_petersen() -> AnalysisConfig {
    AnalysisConfig {
        schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
        description: Some(PresetName::LincolnPetersen.description().to_string()),
        grid: population_grid(),
        prior: PriorSpec::Window {
            lower: 2.0,
            upper: 199.0,
        },
        model: ModelSpec::Hypergeometric {
            stages: vec![StageSpec {
                sample_size: 12,
                recaptured: 2,
                marked: Some(14),
            }],
        },
        coverage: crate::analysis::DEFAULT_COVERAGE,
    }
}

fn two_stage() -> AnalysisConfig {
    AnalysisConfig {
        schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
        description: Some(PresetName::TwoStage.description().to_string()),
        grid: population_grid(),
        prior: PriorSpec::Uniform,
        model: ModelSpec::Hypergeometric {
            stages: vec![
                StageSpec {
                    sample_size: 14,
                    recaptured: 0,
                    marked: None,
                },
                StageSpec {
                    sample_size: 12,
                    recaptured: 2,
                    marked: None,
                },
            ],
        },
        coverage: crate::analysis::DEFAULT_COVERAGE,
    }
}

fn two_test() -> AnalysisConfig {
    AnalysisConfig {
        schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
        description: Some(PresetName::TwoTest.description().to_string()),
        grid: population_grid(),
        prior: PriorSpec::Uniform,
        model: ModelSpec::TwoTest {
            counts: TwoTestCounts {
                k10: 10,
                k01: 2,
                k11: 2,
            },
            detection_grid: GridSpec::default(),
            p1_prior: PriorSpec::Uniform,
            p2_prior: PriorSpec::Uniform,
        },
        coverage: crate::analysis::DEFAULT_COVERAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_analysis;

    #[test]
    fn every_preset_validates() {
        for name in PresetName::ALL {
            let config = get_preset(*name);
            validate_analysis(&config).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn parse_aliases() {
        assert_eq!(PresetName::parse("LP"), Some(PresetName::LincolnPetersen));
        assert_eq!(PresetName::parse("two_stage"), Some(PresetName::TwoStage));
        assert_eq!(PresetName::parse("2x2"), Some(PresetName::TwoTest));
        assert_eq!(PresetName::parse("bogus"), None);
    }

    #[test]
    fn unknown_preset_lists_available() {
        let err = "bogus".parse::<PresetName>().unwrap_err();
        let msg = err.to_string();
        for name in PresetName::ALL {
            assert!(msg.contains(name.as_str()));
        }
    }

    #[test]
    fn list_covers_all() {
        let list = list_presets();
        assert_eq!(list.len(), PresetName::ALL.len());
        assert_eq!(list[2].model, "two_test");
    }

    #[test]
    fn presets_are_deterministic() {
        for name in PresetName::ALL {
            assert_eq!(get_preset(*name), get_preset(*name));
        }
    }
}
