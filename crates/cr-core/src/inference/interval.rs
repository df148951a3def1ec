//! Highest-posterior-density intervals by exhaustive search.
//!
//! For every pair `lo < hi` the covered mass is accumulated with widths to
//! the left of each point:
//!
//! ```text
//! mass(lo, hi) = Σ_{i=lo+1..=hi} (grid[i] − grid[i−1]) · density[i]
//! ```
//!
//! Among pairs whose mass reaches the target coverage the one with the
//! largest `mass / (grid[hi] − grid[lo])` wins. The scan runs `lo` then `hi`
//! ascending and only replaces the incumbent on a strictly larger ratio, so
//! exact ties resolve to the first pair found. Quadratic in grid length.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Distribution, Grid};

/// Absolute slack when comparing accumulated mass to the target coverage.
pub const COVERAGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntervalError {
    #[error("interval search needs at least 2 grid points, got {len}")]
    InsufficientGrid { len: usize },
    #[error("density has {values} values but the grid has {grid} points")]
    LengthMismatch { grid: usize, values: usize },
    #[error("grid must be finite and strictly increasing; index {index} holds {value}")]
    UnorderedGrid { index: usize, value: f64 },
    #[error("coverage must be in (0, 1], got {coverage}")]
    InvalidCoverage { coverage: f64 },
    #[error("density at index {index} is invalid ({value})")]
    InvalidDensity { index: usize, value: f64 },
    #[error("no interval reaches coverage {target}; best attainable is {best:.6}")]
    CoverageUnattainable { target: f64, best: f64 },
}

/// A credible interval between two grid values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
    /// Mass actually covered.
    pub coverage: f64,
    pub width: f64,
}

impl Interval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Brute-force HPDI search.
#[derive(Debug, Clone, Copy)]
pub struct IntervalFinder {
    tolerance: f64,
}

impl Default for IntervalFinder {
    fn default() -> Self {
        Self {
            tolerance: COVERAGE_TOLERANCE,
        }
    }
}

impl IntervalFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Narrowest-per-mass interval covering at least `coverage`.
    pub fn find(
        &self,
        grid: &[f64],
        density: &[f64],
        coverage: f64,
    ) -> Result<Interval, IntervalError> {
        let n = grid.len();
        if n < 2 {
            return Err(IntervalError::InsufficientGrid { len: n });
        }
        if density.len() != n {
            return Err(IntervalError::LengthMismatch {
                grid: n,
                values: density.len(),
            });
        }
        if !grid[0].is_finite() {
            return Err(IntervalError::UnorderedGrid {
                index: 0,
                value: grid[0],
            });
        }
        if let Some(index) = grid
            .windows(2)
            .position(|w| !(w[1] > w[0] && w[1].is_finite()))
        {
            return Err(IntervalError::UnorderedGrid {
                index: index + 1,
                value: grid[index + 1],
            });
        }
        if !(coverage > 0.0 && coverage <= 1.0) {
            return Err(IntervalError::InvalidCoverage { coverage });
        }
        if let Some((index, &value)) = density
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d < 0.0)
        {
            return Err(IntervalError::InvalidDensity { index, value });
        }

        let target = coverage - self.tolerance;
        let mut best: Option<(usize, usize, f64, f64)> = None;
        let mut best_attained = 0.0f64;

        for lo in 0..n - 1 {
            let mut mass = 0.0;
            for hi in lo + 1..n {
                mass += (grid[hi] - grid[hi - 1]) * density[hi];
                best_attained = best_attained.max(mass);
                if mass < target {
                    continue;
                }
                let ratio = mass / (grid[hi] - grid[lo]);
                if best.is_none_or(|(_, _, _, r)| ratio > r) {
                    best = Some((lo, hi, mass, ratio));
                }
            }
        }

        match best {
            Some((lo, hi, mass, _)) => Ok(Interval {
                lower: grid[lo],
                upper: grid[hi],
                coverage: mass,
                width: grid[hi] - grid[lo],
            }),
            None => Err(IntervalError::CoverageUnattainable {
                target: coverage,
                best: best_attained,
            }),
        }
    }

    /// [`IntervalFinder::find`] over a distribution's masses.
    pub fn find_in(
        &self,
        grid: &Grid,
        distribution: &Distribution,
        coverage: f64,
    ) -> Result<Interval, IntervalError> {
        self.find(grid.values(), &distribution.densities(grid), coverage)
    }
}

/// Grid value carrying the largest mass; first occurrence on ties.
pub fn map_estimate(grid: &[f64], mass: &[f64]) -> Result<f64, IntervalError> {
    if grid.is_empty() {
        return Err(IntervalError::InsufficientGrid { len: 0 });
    }
    if mass.len() != grid.len() {
        return Err(IntervalError::LengthMismatch {
            grid: grid.len(),
            values: mass.len(),
        });
    }
    let mut best = 0;
    for (i, &m) in mass.iter().enumerate().skip(1) {
        if m > mass[best] || mass[best].is_nan() {
            best = i;
        }
    }
    Ok(grid[best])
}
