//! Parameter grids and discretized distributions over them.
//!
//! A [`Grid`] is the fixed set of hypotheses an analysis reasons about; a
//! [`Distribution`] assigns each hypothesis a probability mass. Grids are
//! validated once at construction so downstream code can index freely.

use cr_math::{kahan_sum, normalize_weights};
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

/// Errors raised when constructing a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid needs at least 2 points, got {len}")]
    TooShort { len: usize },
    #[error("grid value at index {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },
    #[error("grid must be strictly increasing (index {index}: {previous} then {value})")]
    NotIncreasing {
        index: usize,
        previous: f64,
        value: f64,
    },
}

/// Strictly increasing, finite sequence of hypothesis values (length >= 2).
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Grid {
    values: Vec<f64>,
}

impl Grid {
    pub fn new(values: Vec<f64>) -> Result<Self, GridError> {
        if values.len() < 2 {
            return Err(GridError::TooShort { len: values.len() });
        }
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NonFinite { index, value });
            }
            if index > 0 && value <= values[index - 1] {
                return Err(GridError::NotIncreasing {
                    index,
                    previous: values[index - 1],
                    value,
                });
            }
        }
        Ok(Self { values })
    }

    /// Integer hypotheses `start..=end`.
    pub fn integers(start: i64, end: i64) -> Result<Self, GridError> {
        Self::new((start..=end).map(|v| v as f64).collect())
    }

    /// `points` evenly spaced values from `start` to `end` inclusive.
    pub fn linspace(start: f64, end: f64, points: usize) -> Result<Self, GridError> {
        if points < 2 {
            return Err(GridError::TooShort { len: points });
        }
        let step = (end - start) / (points - 1) as f64;
        let mut values: Vec<f64> = (0..points).map(|i| start + step * i as f64).collect();
        values[points - 1] = end;
        Self::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Width attributed to point `i`: the gap to its left neighbour, or to
    /// its right neighbour for the first point.
    pub fn gap(&self, i: usize) -> f64 {
        if i == 0 {
            self.values[1] - self.values[0]
        } else {
            self.values[i] - self.values[i - 1]
        }
    }
}

/// Probability masses over a grid.
///
/// Constructed normalized; every update produces a fresh value.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Distribution {
    masses: Vec<f64>,
}

impl Distribution {
    /// Normalize non-negative weights. `None` when the total is zero or
    /// not finite, or any weight is negative.
    pub fn from_weights(weights: &[f64]) -> Option<Self> {
        if weights.iter().any(|w| w.is_nan() || *w < 0.0) {
            return None;
        }
        normalize_weights(weights).map(|masses| Self { masses })
    }

    /// Uniform masses over `len` points.
    pub fn uniform(len: usize) -> Option<Self> {
        Self::from_weights(&vec![1.0; len])
    }

    /// Wrap masses that are already normalized.
    pub(crate) fn from_normalized(masses: Vec<f64>) -> Self {
        Self { masses }
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn total(&self) -> f64 {
        kahan_sum(&self.masses)
    }

    /// Right-endpoint densities: `mass[i] / gap(i)`.
    ///
    /// Integrating these with the interval search's rule (width to the left
    /// of each point) reproduces the summed mass of the covered points.
    pub fn densities(&self, grid: &Grid) -> Vec<f64> {
        self.masses
            .iter()
            .enumerate()
            .map(|(i, m)| m / grid.gap(i))
            .collect()
    }

    pub fn mean(&self, grid: &Grid) -> f64 {
        let terms: Vec<f64> = self
            .masses
            .iter()
            .zip(grid.values())
            .map(|(m, x)| m * x)
            .collect();
        kahan_sum(&terms)
    }

    pub fn sd(&self, grid: &Grid) -> f64 {
        let mean = self.mean(grid);
        let terms: Vec<f64> = self
            .masses
            .iter()
            .zip(grid.values())
            .map(|(m, x)| m * (x - mean) * (x - mean))
            .collect();
        kahan_sum(&terms).max(0.0).sqrt()
    }

    /// Smallest grid value whose cumulative mass reaches `q`.
    pub fn quantile(&self, grid: &Grid, q: f64) -> f64 {
        let mut acc = 0.0;
        for (m, x) in self.masses.iter().zip(grid.values()) {
            acc += m;
            if acc >= q {
                return *x;
            }
        }
        grid.last()
    }

    pub fn median(&self, grid: &Grid) -> f64 {
        self.quantile(grid, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rejects_bad_input() {
        assert_eq!(Grid::new(vec![1.0]), Err(GridError::TooShort { len: 1 }));
        assert!(matches!(
            Grid::new(vec![1.0, f64::NAN]),
            Err(GridError::NonFinite { index: 1, .. })
        ));
        assert!(matches!(
            Grid::new(vec![1.0, 3.0, 3.0]),
            Err(GridError::NotIncreasing { index: 2, .. })
        ));
    }

    #[test]
    fn integer_and_linspace_grids() {
        let g = Grid::integers(1, 200).unwrap();
        assert_eq!(g.len(), 200);
        assert_eq!(g.first(), 1.0);
        assert_eq!(g.last(), 200.0);

        let p = Grid::linspace(0.0, 1.0, 11).unwrap();
        assert_eq!(p.len(), 11);
        assert_eq!(p.last(), 1.0);
        assert!((p.values()[3] - 0.3).abs() < 1e-12);
        assert!(Grid::linspace(0.0, 1.0, 1).is_err());
    }

    #[test]
    fn gaps_use_left_neighbour() {
        let g = Grid::new(vec![0.0, 1.0, 3.0, 6.0]).unwrap();
        assert_eq!(g.gap(0), 1.0);
        assert_eq!(g.gap(1), 1.0);
        assert_eq!(g.gap(2), 2.0);
        assert_eq!(g.gap(3), 3.0);
    }

    #[test]
    fn distribution_normalizes() {
        let d = Distribution::from_weights(&[1.0, 3.0]).unwrap();
        assert_eq!(d.masses(), &[0.25, 0.75]);
        assert!(Distribution::from_weights(&[0.0, 0.0]).is_none());
        assert!(Distribution::from_weights(&[1.0, -1.0]).is_none());
        assert!(Distribution::from_weights(&[1.0, f64::NAN]).is_none());
    }

    #[test]
    fn densities_integrate_back_to_mass() {
        let g = Grid::new(vec![0.0, 1.0, 3.0, 6.0]).unwrap();
        let d = Distribution::from_weights(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        let dens = d.densities(&g);
        for i in 0..g.len() {
            assert!((dens[i] * g.gap(i) - d.masses()[i]).abs() < 1e-15);
        }
    }

    #[test]
    fn moments_of_two_point_mass() {
        let g = Grid::new(vec![0.0, 2.0]).unwrap();
        let d = Distribution::uniform(2).unwrap();
        assert!((d.mean(&g) - 1.0).abs() < 1e-12);
        assert!((d.sd(&g) - 1.0).abs() < 1e-12);
        assert_eq!(d.median(&g), 0.0);
        assert_eq!(d.quantile(&g, 0.9), 2.0);
    }
}
