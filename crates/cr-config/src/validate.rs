//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::analysis::{resolve_marked, AnalysisConfig, GridSpec, ModelSpec, PriorSpec};
use crate::MAX_GRID_POINTS;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Validate an analysis configuration semantically.
pub fn validate_analysis(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if !(config.coverage > 0.0 && config.coverage <= 1.0) {
        return Err(invalid(
            "coverage",
            format!("must be in (0, 1], got {}", config.coverage),
        ));
    }

    let grid = validate_grid(&config.grid, "grid")?;
    if grid.iter().any(|v| *v < 0.0) {
        return Err(invalid("grid", "population sizes must be non-negative"));
    }
    validate_prior(&config.prior, &grid, "prior")?;

    match &config.model {
        ModelSpec::Hypergeometric { stages } => {
            if stages.is_empty() {
                return Err(invalid("model.stages", "at least one stage is required"));
            }
            resolve_marked(stages)?;
        }
        ModelSpec::TwoTest {
            counts,
            detection_grid,
            p1_prior,
            p2_prior,
        } => {
            let detection = validate_grid(detection_grid, "model.detection_grid")?;
            if detection.iter().any(|p| !(0.0..=1.0).contains(p)) {
                return Err(invalid(
                    "model.detection_grid",
                    "detection probabilities must lie in [0, 1]",
                ));
            }
            validate_prior(p1_prior, &detection, "model.p1_prior")?;
            validate_prior(p2_prior, &detection, "model.p2_prior")?;
            let found = counts
                .found()
                .ok_or_else(|| invalid("model.counts", "cell counts overflow when summed"))?;
            let max_n = grid.last().copied().unwrap_or(0.0);
            if (found as f64) > max_n {
                return Err(ValidationError::SemanticError(format!(
                    "grid maximum {max_n} is below the {found} distinct individuals found"
                )));
            }
        }
    }

    Ok(())
}

/// Validate a grid spec and return its values.
///
/// Grids need at least two finite, strictly increasing points and at most
/// [`MAX_GRID_POINTS`]. The size is checked before any value is built.
pub fn validate_grid(spec: &GridSpec, field: &str) -> ValidationResult<Vec<f64>> {
    if spec.len() > MAX_GRID_POINTS {
        return Err(invalid(
            field,
            format!(
                "describes {} points; at most {MAX_GRID_POINTS} are supported",
                spec.len()
            ),
        ));
    }
    if let GridSpec::Linspace { start, end, .. } = spec {
        if !(start.is_finite() && end.is_finite()) {
            return Err(invalid(field, "linspace bounds must be finite"));
        }
    }
    let values = spec.values();
    if values.len() < 2 {
        return Err(invalid(
            field,
            format!("needs at least 2 points, got {}", values.len()),
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(invalid(field, format!("non-finite value {bad}")));
    }
    if let Some(pos) = values.windows(2).position(|w| w[1] <= w[0]) {
        return Err(invalid(
            field,
            format!(
                "values must be strictly increasing ({} then {} at index {})",
                values[pos],
                values[pos + 1],
                pos + 1
            ),
        ));
    }
    Ok(values)
}

/// Validate a prior against its grid.
pub fn validate_prior(spec: &PriorSpec, grid: &[f64], field: &str) -> ValidationResult<()> {
    match spec {
        PriorSpec::Uniform => Ok(()),
        PriorSpec::Window { lower, upper } => {
            if !(lower.is_finite() && upper.is_finite()) || lower > upper {
                return Err(invalid(
                    field,
                    format!("window [{lower}, {upper}] must be finite with lower <= upper"),
                ));
            }
            if !grid.iter().any(|v| v >= lower && v <= upper) {
                return Err(invalid(
                    field,
                    format!("window [{lower}, {upper}] contains no grid point"),
                ));
            }
            Ok(())
        }
        PriorSpec::Weights { values } => {
            if values.len() != grid.len() {
                return Err(invalid(
                    field,
                    format!(
                        "{} weights for {} grid points",
                        values.len(),
                        grid.len()
                    ),
                ));
            }
            if values.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(invalid(field, "weights must be finite and non-negative"));
            }
            if values.iter().all(|w| *w == 0.0) {
                return Err(invalid(field, "weights are all zero"));
            }
            Ok(())
        }
    }
}
