//! Point and interval summaries of a grid posterior.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grid::{Distribution, Grid};
use super::interval::{map_estimate, Interval, IntervalError, IntervalFinder};
use crate::logging::event_names;

/// What a reader wants first from a posterior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosteriorSummary {
    pub map: f64,
    pub mean: f64,
    pub median: f64,
    pub sd: f64,
    pub interval: Interval,
}

impl PosteriorSummary {
    pub fn compute(
        grid: &Grid,
        distribution: &Distribution,
        coverage: f64,
    ) -> Result<Self, IntervalError> {
        let map = map_estimate(grid.values(), distribution.masses())?;
        let interval = IntervalFinder::new().find_in(grid, distribution, coverage)?;
        debug!(
            target: event_names::INTERVAL_FOUND,
            lower = interval.lower,
            upper = interval.upper,
            coverage = interval.coverage,
            "credible interval found"
        );
        Ok(Self {
            map,
            mean: distribution.mean(grid),
            median: distribution.median(grid),
            sd: distribution.sd(grid),
            interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_symmetric_posterior() {
        let grid = Grid::integers(0, 4).unwrap();
        let dist = Distribution::from_weights(&[0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
        let s = PosteriorSummary::compute(&grid, &dist, 0.5).unwrap();
        assert_eq!(s.map, 2.0);
        assert!((s.mean - 2.0).abs() < 1e-12);
        assert_eq!(s.median, 2.0);
        assert!(s.interval.contains(2.0));
        assert!(s.interval.coverage >= 0.5 - 1e-9);
    }

    #[test]
    fn interval_errors_propagate() {
        let grid = Grid::integers(0, 2).unwrap();
        let dist = Distribution::from_weights(&[0.9, 0.05, 0.05]).unwrap();
        assert!(matches!(
            PosteriorSummary::compute(&grid, &dist, 0.95),
            Err(IntervalError::CoverageUnattainable { .. })
        ));
    }
}
