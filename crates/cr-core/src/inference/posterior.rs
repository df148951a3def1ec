//! Grid posterior updates.
//!
//! `posterior[i] ∝ prior[i] · L(grid[i])`, computed in log space and
//! normalized. Updates are pure: the prior is borrowed and a fresh
//! [`Distribution`] is returned, so chaining posterior → prior implements a
//! multi-stage analysis.

use cr_math::{log_sum_exp, normalize_log_probs};
use thiserror::Error;
use tracing::debug;

use super::grid::{Distribution, Grid};
use super::likelihood::Likelihood;
use crate::logging::event_names;

/// Errors raised during a posterior update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PosteriorError {
    #[error("prior has {prior} masses but the grid has {grid} points")]
    LengthMismatch { grid: usize, prior: usize },
    #[error("prior mass at index {index} is invalid ({value})")]
    InvalidPrior { index: usize, value: f64 },
    #[error("likelihood at grid value {value} is invalid ({likelihood})")]
    InvalidLikelihood { value: f64, likelihood: f64 },
    #[error("posterior is degenerate: {0}")]
    DegeneratePosterior(String),
}

/// Stateless updater bound to one grid.
#[derive(Debug, Clone)]
pub struct GridPosterior {
    grid: Grid,
}

impl GridPosterior {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// One Bayesian update. The prior need not be normalized.
    pub fn update<L>(&self, prior: &[f64], likelihood: &L) -> Result<Distribution, PosteriorError>
    where
        L: Likelihood + ?Sized,
    {
        update(&self.grid, prior, likelihood)
    }

    /// Fold `stages` over `prior`, returning the posterior after each stage.
    pub fn update_all<L>(
        &self,
        prior: &[f64],
        stages: &[L],
    ) -> Result<Vec<Distribution>, PosteriorError>
    where
        L: Likelihood,
    {
        let mut out: Vec<Distribution> = Vec::with_capacity(stages.len());
        for (stage, likelihood) in stages.iter().enumerate() {
            let current = out.last().map(Distribution::masses).unwrap_or(prior);
            let next = self.update(current, likelihood).map_err(|e| match e {
                PosteriorError::DegeneratePosterior(msg) => {
                    PosteriorError::DegeneratePosterior(format!("stage {stage}: {msg}"))
                }
                other => other,
            })?;
            out.push(next);
        }
        Ok(out)
    }
}

/// Log of every prior mass, rejecting negative or NaN entries.
pub(crate) fn log_prior(prior: &[f64]) -> Result<Vec<f64>, PosteriorError> {
    prior
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if value.is_nan() || value < 0.0 {
                Err(PosteriorError::InvalidPrior { index, value })
            } else if value == 0.0 {
                Ok(f64::NEG_INFINITY)
            } else {
                Ok(value.ln())
            }
        })
        .collect()
}

/// `posterior[i] = prior[i]·L(grid[i]) / Σ_j prior[j]·L(grid[j])`.
pub fn update<L>(grid: &Grid, prior: &[f64], likelihood: &L) -> Result<Distribution, PosteriorError>
where
    L: Likelihood + ?Sized,
{
    if prior.len() != grid.len() {
        return Err(PosteriorError::LengthMismatch {
            grid: grid.len(),
            prior: prior.len(),
        });
    }
    let log_prior = log_prior(prior)?;

    let mut log_weights = Vec::with_capacity(grid.len());
    for (&value, &lp) in grid.values().iter().zip(&log_prior) {
        let ll = likelihood.log_likelihood(value);
        if ll.is_nan() {
            return Err(PosteriorError::InvalidLikelihood {
                value,
                likelihood: likelihood.likelihood(value),
            });
        }
        if ll == f64::INFINITY {
            return Err(PosteriorError::DegeneratePosterior(format!(
                "likelihood is infinite at grid value {value}"
            )));
        }
        // Zero prior mass wins over any finite likelihood.
        log_weights.push(if lp == f64::NEG_INFINITY { lp } else { lp + ll });
    }

    let log_evidence = log_sum_exp(&log_weights);
    if !log_evidence.is_finite() {
        return Err(PosteriorError::DegeneratePosterior(
            "prior × likelihood sums to zero over the grid".to_string(),
        ));
    }

    let masses: Vec<f64> = normalize_log_probs(&log_weights)
        .into_iter()
        .map(f64::exp)
        .collect();

    debug!(
        target: event_names::POSTERIOR_UPDATED,
        grid_points = grid.len(),
        log_evidence,
        "posterior updated"
    );
    Ok(Distribution::from_normalized(masses))
}
