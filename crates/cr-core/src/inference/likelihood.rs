//! Likelihood functions over a one-dimensional hypothesis grid.
//!
//! A likelihood maps a hypothesis value to a non-negative number; values
//! outside the support are exactly zero, never an error. Evaluators work in
//! log space and override [`Likelihood::log_likelihood`] directly.

use cr_math::{hypergeometric, multinomial};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Grid value to likelihood.
pub trait Likelihood {
    fn likelihood(&self, value: f64) -> f64;

    /// Natural log of [`Likelihood::likelihood`]; NEG_INFINITY for zero.
    fn log_likelihood(&self, value: f64) -> f64 {
        let l = self.likelihood(value);
        if l == 0.0 {
            f64::NEG_INFINITY
        } else {
            l.ln()
        }
    }
}

impl<F> Likelihood for F
where
    F: Fn(f64) -> f64,
{
    fn likelihood(&self, value: f64) -> f64 {
        self(value)
    }
}

/// One mark–recapture stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CaptureStage {
    /// Marked individuals in the population before this sample (`k`).
    pub marked: u64,
    /// Individuals drawn (`n`).
    pub sample_size: u64,
    /// Drawn individuals already carrying a mark (`y`).
    pub recaptured: u64,
}

impl CaptureStage {
    pub fn new(marked: u64, sample_size: u64, recaptured: u64) -> Self {
        Self {
            marked,
            sample_size,
            recaptured,
        }
    }

    /// Newly marked individuals after this stage.
    pub fn newly_marked(&self) -> u64 {
        self.sample_size.saturating_sub(self.recaptured)
    }

    pub fn likelihood(self) -> Hypergeometric {
        Hypergeometric { stage: self }
    }
}

/// 2×2 detection table from two independent tests.
///
/// `k00` (missed by both) is unobserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TwoTestTable {
    pub k10: u64,
    pub k01: u64,
    pub k11: u64,
}

impl TwoTestTable {
    pub fn new(k10: u64, k01: u64, k11: u64) -> Self {
        Self { k10, k01, k11 }
    }

    /// Distinct individuals found by at least one test, saturating at `u64::MAX`.
    pub fn found(&self) -> u64 {
        self.k10.saturating_add(self.k01).saturating_add(self.k11)
    }

    /// Likelihood over the population size at fixed detection probabilities.
    pub fn likelihood(self, p1: f64, p2: f64) -> TwoTest {
        TwoTest {
            table: self,
            p1,
            p2,
        }
    }
}

/// An immutable observation record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Capture(CaptureStage),
    TwoTest(TwoTestTable),
}

/// Hypergeometric likelihood of one stage as a function of `N`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hypergeometric {
    pub stage: CaptureStage,
}

impl Likelihood for Hypergeometric {
    fn likelihood(&self, value: f64) -> f64 {
        let s = self.stage;
        hypergeometric::pmf_at(value, s.marked, s.sample_size, s.recaptured)
    }

    fn log_likelihood(&self, value: f64) -> f64 {
        let s = self.stage;
        hypergeometric::log_pmf_at(value, s.marked, s.sample_size, s.recaptured)
    }
}

/// Multinomial two-test likelihood as a function of `N` at fixed `(p1, p2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoTest {
    pub table: TwoTestTable,
    pub p1: f64,
    pub p2: f64,
}

impl Likelihood for TwoTest {
    fn likelihood(&self, value: f64) -> f64 {
        cr_math::exp_or_zero(self.log_likelihood(value)).min(1.0)
    }

    fn log_likelihood(&self, value: f64) -> f64 {
        let t = self.table;
        multinomial::two_test_log_pmf_at(value, t.k10, t.k01, t.k11, self.p1, self.p2)
    }
}

/// Joint likelihood of two independent observations.
#[derive(Debug, Clone, Copy)]
pub struct Product<A, B> {
    pub left: A,
    pub right: B,
}

impl<A: Likelihood, B: Likelihood> Product<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<A: Likelihood, B: Likelihood> Likelihood for Product<A, B> {
    fn likelihood(&self, value: f64) -> f64 {
        self.left.likelihood(value) * self.right.likelihood(value)
    }

    fn log_likelihood(&self, value: f64) -> f64 {
        let left = self.left.log_likelihood(value);
        if left == f64::NEG_INFINITY {
            return left;
        }
        left + self.right.log_likelihood(value)
    }
}
