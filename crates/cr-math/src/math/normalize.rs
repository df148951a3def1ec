//! Normalization of discrete mass vectors, in linear and log space.

use super::stable::log_sum_exp;

/// Compensated (Kahan) sum.
///
/// Grid posteriors routinely mix masses spanning many orders of magnitude,
/// so the naive left fold drifts noticeably on a few hundred points.
pub fn kahan_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for &v in values {
        let y = v - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Normalize a non-negative weight vector so it sums to 1.
///
/// Returns `None` when the total is zero, negative or non-finite.
pub fn normalize_weights(weights: &[f64]) -> Option<Vec<f64>> {
    let total = kahan_sum(weights);
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    Some(weights.iter().map(|w| w / total).collect())
}

/// Normalize log-weights so that `sum(exp(out)) == 1`.
///
/// All entries come back NaN when every input is -inf or any input is NaN;
/// callers detect that and report a degenerate distribution.
pub fn normalize_log_probs(log_values: &[f64]) -> Vec<f64> {
    let lse = log_sum_exp(log_values);
    if !lse.is_finite() {
        return vec![f64::NAN; log_values.len()];
    }
    log_values.iter().map(|v| v - lse).collect()
}
