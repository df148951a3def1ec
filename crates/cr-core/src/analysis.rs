//! End-to-end analysis: configuration in, report out.
//!
//! Builds the grids and priors an [`AnalysisConfig`] describes, runs the
//! posterior updates for its model and summarizes every stage.

use chrono::{DateTime, Utc};
use cr_config::{
    resolve_marked, validate_analysis, AnalysisConfig, ConfigSnapshot, ModelSpec, ValidationError,
};
use cr_math::hypergeometric;
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::inference::{
    map_estimate, CaptureStage, Distribution, Grid, GridError, GridPosterior, Hypergeometric,
    Interval, IntervalError, IntervalFinder, Observation, PosteriorError, PosteriorSummary,
    TwoTestSweep, TwoTestTable,
};
use crate::logging::{event_names, Stage};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Posterior(#[from] PosteriorError),

    #[error(transparent)]
    Interval(#[from] IntervalError),
}

impl From<AnalysisError> for cr_common::Error {
    fn from(err: AnalysisError) -> Self {
        use cr_common::Error;
        match err {
            AnalysisError::Validation(ValidationError::IoError(msg)) => {
                Error::Io(std::io::Error::other(msg))
            }
            AnalysisError::Validation(e) => Error::Config(e.to_string()),
            AnalysisError::Grid(e) => Error::InvalidGrid(e.to_string()),
            AnalysisError::Posterior(e) => match e {
                PosteriorError::DegeneratePosterior(msg) => Error::DegeneratePosterior(msg),
                PosteriorError::LengthMismatch { .. } | PosteriorError::InvalidPrior { .. } => {
                    Error::InvalidPrior(e.to_string())
                }
                PosteriorError::InvalidLikelihood { .. } => Error::Inference(e.to_string()),
            },
            AnalysisError::Interval(e) => match e {
                IntervalError::CoverageUnattainable { target, best } => {
                    Error::CoverageUnattainable { target, best }
                }
                IntervalError::InsufficientGrid { len } => Error::InsufficientGrid { len },
                IntervalError::InvalidCoverage { .. } => Error::Config(e.to_string()),
                IntervalError::LengthMismatch { .. }
                | IntervalError::InvalidDensity { .. }
                | IntervalError::UnorderedGrid { .. } => Error::Inference(e.to_string()),
            },
        }
    }
}

/// Shape of the population grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct GridSummary {
    pub points: usize,
    pub min: f64,
    pub max: f64,
}

impl GridSummary {
    fn of(grid: &Grid) -> Self {
        Self {
            points: grid.len(),
            min: grid.first(),
            max: grid.last(),
        }
    }
}

/// Closed-form estimates that ignore the prior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct PointEstimates {
    /// `k·n / y`; absent when nothing was recaptured.
    pub lincoln_petersen: Option<f64>,
    /// `(k+1)(n+1)/(y+1) − 1`.
    pub chapman: f64,
}

impl PointEstimates {
    pub fn new(marked: u64, sample_size: u64, recaptured: u64) -> Self {
        Self {
            lincoln_petersen: hypergeometric::lincoln_petersen(marked, sample_size, recaptured),
            chapman: hypergeometric::chapman(marked, sample_size, recaptured),
        }
    }

    /// Test 1 finds are the marks, test 2 the recapture sample.
    pub fn from_table(table: &TwoTestTable) -> Self {
        Self::new(table.k10 + table.k11, table.k01 + table.k11, table.k11)
    }
}

/// Posterior after one observation.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StageReport {
    pub index: usize,
    pub observation: Observation,
    pub estimates: PointEstimates,
    pub map: f64,
    pub mean: f64,
    pub sd: f64,
    /// Absent when no interval reaches the coverage at this stage.
    pub interval: Option<Interval>,
}

/// Detection-probability marginals of a two-test analysis.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TwoTestReport {
    pub detection_points: usize,
    pub p1: DetectionSummary,
    pub p2: DetectionSummary,
    /// `(N, p1, p2)` with the largest joint mass.
    pub joint_map: (f64, f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct DetectionSummary {
    pub map: f64,
    pub mean: f64,
    pub sd: f64,
    pub interval: Option<Interval>,
}

/// One grid point of the final posterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct DistributionPoint {
    pub value: f64,
    pub mass: f64,
}

/// Everything `cr-core run` reports.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AnalysisReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: String,
    pub coverage: f64,
    pub grid: GridSummary,
    pub stages: Vec<StageReport>,
    /// Summary of the final population posterior.
    pub posterior: PosteriorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_test: Option<TwoTestReport>,
    pub distribution: Vec<DistributionPoint>,
    /// Provenance of the analysis, when it came through config loading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSnapshot>,
}

/// Run the analysis `config` describes.
///
/// Intermediate summaries tolerate an unattainable coverage; the final
/// summary does not.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    validate_analysis(config)?;
    let grid = Grid::new(config.grid.values())?;
    let prior = config.prior.weights(grid.values());

    info!(
        target: event_names::ANALYSIS_STARTED,
        stage = %Stage::Update,
        model = config.model.kind(),
        grid_points = grid.len(),
        coverage = config.coverage,
        "analysis started"
    );

    let (stages, final_posterior, two_test) = match &config.model {
        ModelSpec::Hypergeometric { stages } => {
            let marked = resolve_marked(stages)?;
            let observations: Vec<CaptureStage> = stages
                .iter()
                .zip(&marked)
                .map(|(s, &k)| CaptureStage::new(k, s.sample_size, s.recaptured))
                .collect();
            let likelihoods: Vec<Hypergeometric> =
                observations.iter().map(|o| o.likelihood()).collect();
            let mut posteriors =
                GridPosterior::new(grid.clone()).update_all(&prior, &likelihoods)?;

            let reports = observations
                .iter()
                .zip(&posteriors)
                .enumerate()
                .map(|(index, (obs, posterior))| {
                    stage_report(
                        index,
                        Observation::Capture(*obs),
                        PointEstimates::new(obs.marked, obs.sample_size, obs.recaptured),
                        &grid,
                        posterior,
                        config.coverage,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            let Some(last) = posteriors.pop() else {
                return Err(ValidationError::InvalidValue {
                    field: "model.stages".to_string(),
                    message: "at least one stage is required".to_string(),
                }
                .into());
            };
            (reports, last, None)
        }
        ModelSpec::TwoTest {
            counts,
            detection_grid,
            p1_prior,
            p2_prior,
        } => {
            let table = TwoTestTable::new(counts.k10, counts.k01, counts.k11);
            let detection = Grid::new(detection_grid.values())?;
            let p1_weights = p1_prior.weights(detection.values());
            let p2_weights = p2_prior.weights(detection.values());
            let sweep = TwoTestSweep {
                population: &grid,
                population_prior: &prior,
                detection: &detection,
                p1_prior: &p1_weights,
                p2_prior: &p2_weights,
            };
            let result = sweep.run(&table)?;

            let report = stage_report(
                0,
                Observation::TwoTest(table),
                PointEstimates::from_table(&table),
                &grid,
                &result.population,
                config.coverage,
            )?;
            let two_test = TwoTestReport {
                detection_points: detection.len(),
                p1: detection_summary("p1", &detection, &result.p1, config.coverage)?,
                p2: detection_summary("p2", &detection, &result.p2, config.coverage)?,
                joint_map: result.joint_map,
            };
            (vec![report], result.population, Some(two_test))
        }
    };

    let posterior = PosteriorSummary::compute(&grid, &final_posterior, config.coverage)?;

    info!(
        target: event_names::ANALYSIS_FINISHED,
        stage = %Stage::Summarize,
        map = posterior.map,
        lower = posterior.interval.lower,
        upper = posterior.interval.upper,
        "analysis finished"
    );

    let distribution = grid
        .values()
        .iter()
        .zip(final_posterior.masses())
        .map(|(&value, &mass)| DistributionPoint { value, mass })
        .collect();

    Ok(AnalysisReport {
        schema_version: cr_common::SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        description: config.description.clone(),
        model: config.model.kind().to_string(),
        coverage: config.coverage,
        grid: GridSummary::of(&grid),
        stages,
        posterior,
        two_test,
        distribution,
        config: None,
    })
}

/// Interval at `coverage`, or `None` with a warning when out of reach.
fn interval_or_warn(
    what: &str,
    grid: &Grid,
    distribution: &Distribution,
    coverage: f64,
) -> Result<Option<Interval>, IntervalError> {
    match IntervalFinder::new().find_in(grid, distribution, coverage) {
        Ok(interval) => Ok(Some(interval)),
        Err(IntervalError::CoverageUnattainable { target, best }) => {
            warn!(
                target: event_names::INTERVAL_UNATTAINABLE,
                stage = %Stage::Summarize,
                posterior = what,
                target_coverage = target,
                best_coverage = best,
                "no interval reaches the requested coverage"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn stage_report(
    index: usize,
    observation: Observation,
    estimates: PointEstimates,
    grid: &Grid,
    posterior: &Distribution,
    coverage: f64,
) -> Result<StageReport, IntervalError> {
    let map = map_estimate(grid.values(), posterior.masses())?;
    let label = format!("stage {index}");
    Ok(StageReport {
        index,
        observation,
        estimates,
        map,
        mean: posterior.mean(grid),
        sd: posterior.sd(grid),
        interval: interval_or_warn(&label, grid, posterior, coverage)?,
    })
}

fn detection_summary(
    name: &str,
    grid: &Grid,
    marginal: &Distribution,
    coverage: f64,
) -> Result<DetectionSummary, IntervalError> {
    Ok(DetectionSummary {
        map: map_estimate(grid.values(), marginal.masses())?,
        mean: marginal.mean(grid),
        sd: marginal.sd(grid),
        interval: interval_or_warn(name, grid, marginal, coverage)?,
    })
}
