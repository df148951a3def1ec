//! Hypergeometric likelihood for a single mark–recapture stage.
//!
//! A population of `N` individuals contains `k` previously marked ones. A
//! sample of `n` is drawn without replacement and `y` of them carry a mark:
//!
//! ```text
//! P(y | N, k, n) = C(k, y) · C(N − k, n − y) / C(N, n)
//! ```
//!
//! Every combinatorially impossible configuration (`y > k`, `y > n`,
//! `n − y > N − k`, `N < k`) has probability exactly zero. Grid sweeps over
//! `N` hit those cases constantly, so they are values, not errors.

use super::stable::{as_count, exp_or_zero, log_binomial};

/// Whether `(N, k, n, y)` describes a drawable configuration.
pub fn is_feasible(population: u64, marked: u64, sample: u64, recaptured: u64) -> bool {
    if population < marked || recaptured > marked || recaptured > sample {
        return false;
    }
    sample - recaptured <= population - marked
}

/// log P(y | N, k, n); NEG_INFINITY for infeasible configurations.
pub fn log_pmf(population: u64, marked: u64, sample: u64, recaptured: u64) -> f64 {
    if !is_feasible(population, marked, sample, recaptured) {
        return f64::NEG_INFINITY;
    }
    log_binomial(marked, recaptured) + log_binomial(population - marked, sample - recaptured)
        - log_binomial(population, sample)
}

/// P(y | N, k, n) in [0, 1].
pub fn pmf(population: u64, marked: u64, sample: u64, recaptured: u64) -> f64 {
    exp_or_zero(log_pmf(population, marked, sample, recaptured)).min(1.0)
}

/// log P(y | N, k, n) for a population hypothesis taken from a real-valued grid.
///
/// Negative, non-finite or non-integral `N` cannot be a head count and
/// evaluates to NEG_INFINITY.
pub fn log_pmf_at(population: f64, marked: u64, sample: u64, recaptured: u64) -> f64 {
    match as_count(population) {
        Some(n) => log_pmf(n, marked, sample, recaptured),
        None => f64::NEG_INFINITY,
    }
}

/// P(y | N, k, n) for a population hypothesis taken from a real-valued grid.
pub fn pmf_at(population: f64, marked: u64, sample: u64, recaptured: u64) -> f64 {
    exp_or_zero(log_pmf_at(population, marked, sample, recaptured)).min(1.0)
}

/// Lincoln–Petersen point estimate `k·n / y`; `None` when no marks came back.
pub fn lincoln_petersen(marked: u64, sample: u64, recaptured: u64) -> Option<f64> {
    if recaptured == 0 {
        return None;
    }
    Some(marked as f64 * sample as f64 / recaptured as f64)
}

/// Chapman's bias-corrected estimate `(k+1)(n+1)/(y+1) − 1`.
pub fn chapman(marked: u64, sample: u64, recaptured: u64) -> f64 {
    (marked as f64 + 1.0) * (sample as f64 + 1.0) / (recaptured as f64 + 1.0) - 1.0
}
