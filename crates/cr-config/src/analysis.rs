//! Analysis configuration types.
//!
//! An analysis file describes one complete run: the parameter grid, the
//! prior over it, the observation model with its data, and the credible
//! interval coverage to report.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Default coverage for reported credible intervals.
pub const DEFAULT_COVERAGE: f64 = 0.95;

/// Default number of points in a detection-probability grid over [0, 1].
pub const DEFAULT_DETECTION_POINTS: usize = 11;

/// Top-level analysis description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    /// Must equal [`crate::CONFIG_SCHEMA_VERSION`].
    pub schema_version: String,

    /// Free-form description shown in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Candidate population sizes.
    pub grid: GridSpec,

    /// Prior over the population grid.
    #[serde(default)]
    pub prior: PriorSpec,

    /// Observation model and its data.
    pub model: ModelSpec,

    /// Credible interval coverage in (0, 1].
    #[serde(default = "default_coverage")]
    pub coverage: f64,
}

fn default_coverage() -> f64 {
    DEFAULT_COVERAGE
}

/// A discretized parameter domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridSpec {
    /// Every integer in `start..=end`.
    Integers { start: i64, end: i64 },
    /// `points` evenly spaced values from `start` to `end` inclusive.
    Linspace { start: f64, end: f64, points: usize },
    /// Explicit values, strictly increasing.
    Values { values: Vec<f64> },
}

impl GridSpec {
    /// Materialize the grid values.
    ///
    /// No validation happens here; see [`crate::validate::validate_grid`].
    pub fn values(&self) -> Vec<f64> {
        match self {
            GridSpec::Integers { start, end } => (*start..=*end).map(|v| v as f64).collect(),
            GridSpec::Linspace { start, end, points } => match *points {
                0 => Vec::new(),
                1 => vec![*start],
                n => {
                    let step = (end - start) / (n - 1) as f64;
                    (0..n)
                        .map(|i| if i == n - 1 { *end } else { start + step * i as f64 })
                        .collect()
                }
            },
            GridSpec::Values { values } => values.clone(),
        }
    }

    /// Number of grid points without materializing them.
    ///
    /// Integer ranges wider than `usize` saturate at `usize::MAX`.
    pub fn len(&self) -> usize {
        match self {
            GridSpec::Integers { start, end } => {
                if end < start {
                    0
                } else {
                    end.checked_sub(*start)
                        .and_then(|span| usize::try_from(span).ok())
                        .and_then(|span| span.checked_add(1))
                        .unwrap_or(usize::MAX)
                }
            }
            GridSpec::Linspace { points, .. } => *points,
            GridSpec::Values { values } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evenly spaced detection probabilities over [0, 1].
    pub fn unit_interval(points: usize) -> Self {
        GridSpec::Linspace {
            start: 0.0,
            end: 1.0,
            points,
        }
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec::unit_interval(DEFAULT_DETECTION_POINTS)
    }
}

/// Prior weights over a grid. Weights need not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriorSpec {
    /// Equal weight on every grid point.
    #[default]
    Uniform,
    /// Equal weight on grid values within `[lower, upper]`, zero elsewhere.
    Window { lower: f64, upper: f64 },
    /// One explicit weight per grid point.
    Weights { values: Vec<f64> },
}

impl PriorSpec {
    /// Prior weights aligned with `grid`.
    pub fn weights(&self, grid: &[f64]) -> Vec<f64> {
        match self {
            PriorSpec::Uniform => vec![1.0; grid.len()],
            PriorSpec::Window { lower, upper } => grid
                .iter()
                .map(|v| if v >= lower && v <= upper { 1.0 } else { 0.0 })
                .collect(),
            PriorSpec::Weights { values } => values.clone(),
        }
    }
}

/// Observation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Sequential mark–recapture stages, each a hypergeometric draw.
    Hypergeometric { stages: Vec<StageSpec> },
    /// Two independent detection processes summarized as a 2×2 table.
    TwoTest {
        counts: TwoTestCounts,
        #[serde(default)]
        detection_grid: GridSpec,
        #[serde(default)]
        p1_prior: PriorSpec,
        #[serde(default)]
        p2_prior: PriorSpec,
    },
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::Hypergeometric { .. } => "hypergeometric",
            ModelSpec::TwoTest { .. } => "two_test",
        }
    }
}

/// One capture occasion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StageSpec {
    /// Individuals caught on this occasion.
    pub sample_size: u64,
    /// Caught individuals that already carried a mark.
    pub recaptured: u64,
    /// Marked individuals at large before this occasion. When omitted it is
    /// the running count of distinct individuals caught on earlier stages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked: Option<u64>,
}

/// Observed cells of a two-test table. `k00` is never observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TwoTestCounts {
    /// Found by test 1 only.
    pub k10: u64,
    /// Found by test 2 only.
    pub k01: u64,
    /// Found by both tests.
    pub k11: u64,
}

impl TwoTestCounts {
    /// Distinct individuals found by at least one test; `None` on overflow.
    pub fn found(&self) -> Option<u64> {
        self.k10.checked_add(self.k01)?.checked_add(self.k11)
    }
}

/// Marked-at-large count before each stage.
///
/// Explicit `marked` values reset the running count; every stage then adds
/// its newly marked individuals (`sample_size − recaptured`).
pub fn resolve_marked(stages: &[StageSpec]) -> ValidationResult<Vec<u64>> {
    let mut running = 0u64;
    let mut out = Vec::with_capacity(stages.len());
    for (i, stage) in stages.iter().enumerate() {
        let marked = stage.marked.unwrap_or(running);
        if stage.recaptured > stage.sample_size {
            return Err(ValidationError::InvalidValue {
                field: format!("model.stages[{i}].recaptured"),
                message: format!(
                    "recaptured ({}) exceeds sample_size ({})",
                    stage.recaptured, stage.sample_size
                ),
            });
        }
        if stage.recaptured > marked {
            return Err(ValidationError::InvalidValue {
                field: format!("model.stages[{i}].recaptured"),
                message: format!(
                    "recaptured ({}) exceeds marked individuals at large ({marked})",
                    stage.recaptured
                ),
            });
        }
        out.push(marked);
        running = marked
            .checked_add(stage.sample_size - stage.recaptured)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: format!("model.stages[{i}].sample_size"),
                message: format!(
                    "{marked} marked plus {} new captures overflows a count",
                    stage.sample_size - stage.recaptured
                ),
            })?;
    }
    Ok(out)
}

impl AnalysisConfig {
    /// Load an analysis file from disk.
    pub fn from_file(path: &std::path::Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse an analysis description from JSON.
    pub fn from_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_grid_is_inclusive() {
        let grid = GridSpec::Integers { start: 1, end: 5 };
        assert_eq!(grid.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(grid.len(), 5);
        assert!(GridSpec::Integers { start: 5, end: 1 }.is_empty());
    }

    #[test]
    fn extreme_integer_range_len_saturates() {
        let grid = GridSpec::Integers {
            start: i64::MIN,
            end: i64::MAX,
        };
        assert_eq!(grid.len(), usize::MAX);
        let grid = GridSpec::Integers {
            start: -3,
            end: i64::MAX - 1,
        };
        assert_eq!(grid.len(), usize::MAX);
        assert_eq!(GridSpec::Integers { start: -2, end: 2 }.len(), 5);
    }

    #[test]
    fn found_reports_overflow() {
        let counts = TwoTestCounts {
            k10: 10,
            k01: 2,
            k11: 2,
        };
        assert_eq!(counts.found(), Some(14));
        let counts = TwoTestCounts {
            k10: u64::MAX,
            k01: 1,
            k11: 0,
        };
        assert_eq!(counts.found(), None);
    }

    #[test]
    fn linspace_hits_both_ends() {
        let grid = GridSpec::unit_interval(11);
        let values = grid.values();
        assert_eq!(values.len(), 11);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[10], 1.0);
        assert!((values[3] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn window_prior_zeroes_outside() {
        let grid: Vec<f64> = (1..=6).map(f64::from).collect();
        let prior = PriorSpec::Window {
            lower: 2.0,
            upper: 5.0,
        };
        assert_eq!(prior.weights(&grid), vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn marked_accumulates_across_stages() {
        let stages = [
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
            StageSpec {
                sample_size: 9,
                recaptured: 4,
                marked: None,
            },
        ];
        assert_eq!(resolve_marked(&stages).unwrap(), vec![0, 14, 24]);
    }

    #[test]
    fn explicit_marked_overrides_running_count() {
        let stages = [StageSpec {
            sample_size: 12,
            recaptured: 2,
            marked: Some(14),
        }];
        assert_eq!(resolve_marked(&stages).unwrap(), vec![14]);
    }

    #[test]
    fn recapture_without_marks_is_rejected() {
        let stages = [StageSpec {
            sample_size: 12,
            recaptured: 2,
            marked: None,
        }];
        let err = resolve_marked(&stages).unwrap_err();
        assert!(err.to_string().contains("stages[0]"));
    }

    #[test]
    fn running_marked_overflow_is_rejected() {
        let stages = [
            StageSpec {
                sample_size: 12,
                recaptured: 2,
                marked: Some(u64::MAX - 5),
            },
            StageSpec {
                sample_size: 3,
                recaptured: 1,
                marked: None,
            },
        ];
        let err = resolve_marked(&stages).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "model.stages[0].sample_size"));
    }

    #[test]
    fn json_defaults_fill_in() {
        let json = r#"{
            "schema_version": "1.0.0",
            "grid": {"kind": "integers", "start": 1, "end": 200},
            "model": {"kind": "two_test", "counts": {"k10": 10, "k01": 2, "k11": 2}}
        }"#;
        let config = AnalysisConfig::from_json(json).expect("parse");
        assert_eq!(config.prior, PriorSpec::Uniform);
        assert_eq!(config.coverage, DEFAULT_COVERAGE);
        match config.model {
            ModelSpec::TwoTest { detection_grid, .. } => {
                assert_eq!(detection_grid.len(), DEFAULT_DETECTION_POINTS)
            }
            other => panic!("unexpected model {other:?}"),
        }
    }
}
