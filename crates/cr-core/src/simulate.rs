//! Synthetic capture histories for checking an analysis end to end.
//!
//! Draws are reproducible from a seed (`StdRng::seed_from_u64`).

use chrono::{DateTime, Utc};
use cr_config::{
    AnalysisConfig, GridSpec, ModelSpec, PriorSpec, StageSpec, TwoTestCounts,
    CONFIG_SCHEMA_VERSION,
};
use rand::seq::index;
use rand::Rng;
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

use crate::inference::{CaptureStage, TwoTestTable};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("stage {stage} samples {sample_size} individuals from a population of {population}")]
    SampleTooLarge {
        stage: usize,
        sample_size: u64,
        population: u64,
    },
    #[error("detection probability {name} = {value} is outside [0, 1]")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("population {population} exceeds the simulation limit of {max}")]
    PopulationTooLarge { population: u64, max: u64 },
}

impl From<SimulationError> for cr_common::Error {
    fn from(err: SimulationError) -> Self {
        cr_common::Error::Config(err.to_string())
    }
}

/// Largest simulated population.
///
/// The emitted analysis grid spans `1..=4N`, which must stay within
/// [`cr_config::MAX_GRID_POINTS`].
pub const MAX_SIMULATED_POPULATION: u64 = (cr_config::MAX_GRID_POINTS / 4) as u64;

fn population_len(population: u64) -> Result<usize, SimulationError> {
    if population > MAX_SIMULATED_POPULATION {
        return Err(SimulationError::PopulationTooLarge {
            population,
            max: MAX_SIMULATED_POPULATION,
        });
    }
    usize::try_from(population).map_err(|_| SimulationError::PopulationTooLarge {
        population,
        max: MAX_SIMULATED_POPULATION,
    })
}

/// Sequential mark–recapture: each stage samples without replacement,
/// counts marks already present, then marks everyone sampled.
pub fn simulate_capture_history<R>(
    population: u64,
    sample_sizes: &[u64],
    rng: &mut R,
) -> Result<Vec<CaptureStage>, SimulationError>
where
    R: Rng + ?Sized,
{
    let len = population_len(population)?;
    if let Some((stage, &sample_size)) = sample_sizes
        .iter()
        .enumerate()
        .find(|(_, n)| **n > population)
    {
        return Err(SimulationError::SampleTooLarge {
            stage,
            sample_size,
            population,
        });
    }

    let mut is_marked = vec![false; len];
    let mut marked = 0u64;
    let mut stages = Vec::with_capacity(sample_sizes.len());
    for &sample_size in sample_sizes {
        let drawn = index::sample(rng, len, sample_size as usize);
        let mut recaptured = 0u64;
        for i in drawn.iter() {
            if is_marked[i] {
                recaptured += 1;
            } else {
                is_marked[i] = true;
            }
        }
        stages.push(CaptureStage::new(marked, sample_size, recaptured));
        marked += sample_size - recaptured;
    }
    Ok(stages)
}

/// Two independent detection passes over every individual.
pub fn simulate_two_test<R>(
    population: u64,
    p1: f64,
    p2: f64,
    rng: &mut R,
) -> Result<TwoTestTable, SimulationError>
where
    R: Rng + ?Sized,
{
    for (name, value) in [("p1", p1), ("p2", p2)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SimulationError::InvalidProbability { name, value });
        }
    }
    population_len(population)?;

    let mut table = TwoTestTable::new(0, 0, 0);
    for _ in 0..population {
        match (rng.random_bool(p1), rng.random_bool(p2)) {
            (true, true) => table.k11 += 1,
            (true, false) => table.k10 += 1,
            (false, true) => table.k01 += 1,
            (false, false) => {}
        }
    }
    Ok(table)
}

/// Output of `cr-core simulate`.
///
/// `analysis` is ready to feed back into `cr-core run --config`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SimulationReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub population: u64,
    pub seed: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<CaptureStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_test: Option<TwoTestTable>,
    pub analysis: AnalysisConfig,
}

impl SimulationReport {
    pub fn capture(population: u64, seed: u64, stages: Vec<CaptureStage>) -> Self {
        let model = ModelSpec::Hypergeometric {
            stages: stages
                .iter()
                .map(|s| StageSpec {
                    sample_size: s.sample_size,
                    recaptured: s.recaptured,
                    marked: None,
                })
                .collect(),
        };
        Self {
            schema_version: cr_common::SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            population,
            seed,
            stages,
            two_test: None,
            analysis: simulated_analysis(population, model),
        }
    }

    pub fn two_test(population: u64, seed: u64, table: TwoTestTable) -> Self {
        let model = ModelSpec::TwoTest {
            counts: TwoTestCounts {
                k10: table.k10,
                k01: table.k01,
                k11: table.k11,
            },
            detection_grid: GridSpec::default(),
            p1_prior: PriorSpec::Uniform,
            p2_prior: PriorSpec::Uniform,
        };
        Self {
            schema_version: cr_common::SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            population,
            seed,
            stages: Vec::new(),
            two_test: Some(table),
            analysis: simulated_analysis(population, model),
        }
    }
}

/// Uniform prior over `1..=4·population`.
fn simulated_analysis(population: u64, model: ModelSpec) -> AnalysisConfig {
    let end = i64::try_from(population.saturating_mul(4))
        .unwrap_or(i64::MAX)
        .max(2);
    AnalysisConfig {
        schema_version: CONFIG_SCHEMA_VERSION.to_string(),
        description: Some(format!("Simulated data, true N = {population}")),
        grid: GridSpec::Integers { start: 1, end },
        prior: PriorSpec::Uniform,
        model,
        coverage: cr_config::analysis::DEFAULT_COVERAGE,
    }
}
