//! Multinomial likelihood for two independent detection processes.
//!
//! Each of `N` individuals is detected by process 1 with probability `p1`
//! and, independently, by process 2 with probability `p2`. The 2×2 table of
//! outcomes has cell probabilities
//!
//! | cell  | meaning             | probability        |
//! |-------|---------------------|--------------------|
//! | `k11` | found by both       | `p1·p2`            |
//! | `k10` | found by 1 only     | `p1·(1−p2)`        |
//! | `k01` | found by 2 only     | `(1−p1)·p2`        |
//! | `k00` | found by neither    | `(1−p1)·(1−p2)`    |
//!
//! `k00 = N − k10 − k01 − k11` is never observed directly. A hypothesis `N`
//! smaller than the number of distinct findings makes `k00` negative and has
//! likelihood exactly zero.

use serde::{Deserialize, Serialize};

use super::stable::{as_count, exp_or_zero, log_factorial};

/// Cell probabilities of the 2×2 detection table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellProbs {
    pub p00: f64,
    pub p10: f64,
    pub p01: f64,
    pub p11: f64,
}

impl CellProbs {
    /// Cell probabilities under independent detection.
    pub fn independent(p1: f64, p2: f64) -> Self {
        Self {
            p00: (1.0 - p1) * (1.0 - p2),
            p10: p1 * (1.0 - p2),
            p01: (1.0 - p1) * p2,
            p11: p1 * p2,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.p00, self.p10, self.p01, self.p11]
    }
}

/// Log multinomial pmf of `counts` under `probs`.
///
/// Zero counts contribute nothing regardless of their probability (`0^0 = 1`).
/// A positive count on a zero-probability cell, a probability outside
/// `[0, 1]`, or mismatched lengths all yield NEG_INFINITY.
pub fn log_pmf(counts: &[u64], probs: &[f64]) -> f64 {
    if counts.len() != probs.len() {
        return f64::NEG_INFINITY;
    }
    let total: u64 = counts.iter().sum();
    let mut log_p = log_factorial(total);
    for (&k, &p) in counts.iter().zip(probs) {
        if !(0.0..=1.0).contains(&p) {
            return f64::NEG_INFINITY;
        }
        log_p -= log_factorial(k);
        if k > 0 {
            if p == 0.0 {
                return f64::NEG_INFINITY;
            }
            log_p += k as f64 * p.ln();
        }
    }
    log_p
}

/// Multinomial pmf in [0, 1].
pub fn pmf(counts: &[u64], probs: &[f64]) -> f64 {
    exp_or_zero(log_pmf(counts, probs)).min(1.0)
}

/// Log-likelihood of an observed two-test table under hypothesis `(N, p1, p2)`.
pub fn two_test_log_pmf(population: u64, k10: u64, k01: u64, k11: u64, p1: f64, p2: f64) -> f64 {
    let Some(k00) = k10
        .checked_add(k01)
        .and_then(|k| k.checked_add(k11))
        .and_then(|found| population.checked_sub(found))
    else {
        return f64::NEG_INFINITY;
    };
    let cells = CellProbs::independent(p1, p2);
    log_pmf(&[k00, k10, k01, k11], &cells.as_array())
}

/// [`two_test_log_pmf`] for a population hypothesis from a real-valued grid.
///
/// Non-count values of `N` evaluate to NEG_INFINITY.
pub fn two_test_log_pmf_at(
    population: f64,
    k10: u64,
    k01: u64,
    k11: u64,
    p1: f64,
    p2: f64,
) -> f64 {
    match as_count(population) {
        Some(n) => two_test_log_pmf(n, k10, k01, k11, p1, p2),
        None => f64::NEG_INFINITY,
    }
}

/// Likelihood of an observed two-test table under hypothesis `(N, p1, p2)`.
pub fn two_test_pmf(population: u64, k10: u64, k01: u64, k11: u64, p1: f64, p2: f64) -> f64 {
    exp_or_zero(two_test_log_pmf(population, k10, k01, k11, p1, p2)).min(1.0)
}
