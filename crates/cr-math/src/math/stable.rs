//! Numerically stable primitives for log-domain counting math.

use std::f64::consts::PI;
use std::sync::OnceLock;

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)
const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)] // These are published numerical constants
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Largest n whose log(n!) is served from the exact summation table.
pub const LOG_FACTORIAL_TABLE_MAX: u64 = 1024;

static LOG_FACTORIAL_TABLE: OnceLock<Vec<f64>> = OnceLock::new();

fn log_factorial_table() -> &'static [f64] {
    LOG_FACTORIAL_TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(LOG_FACTORIAL_TABLE_MAX as usize + 1);
        let mut acc = 0.0;
        table.push(0.0);
        for i in 1..=LOG_FACTORIAL_TABLE_MAX {
            acc += (i as f64).ln();
            table.push(acc);
        }
        table
    })
}

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Natural log of the Gamma function (log |Gamma(z)|).
///
/// Lanczos approximation, reflected for z < 0.5. Poles return NaN.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() || z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }
    if z <= 0.0 && (z - z.round()).abs() < 1e-15 {
        return f64::NAN;
    }
    if z < 0.5 {
        let sin_pi = (PI * z).sin();
        return PI.ln() - sin_pi.abs().ln() - log_gamma(1.0 - z);
    }

    let z_minus = z - 1.0;
    let mut x = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        x += coeff / (z_minus + i as f64);
    }
    let t = z_minus + LANCZOS_G + 0.5;
    LOG_SQRT_2PI + (z_minus + 0.5) * t.ln() - t + x.ln()
}

/// log(n!).
///
/// Exact cumulative sums up to [`LOG_FACTORIAL_TABLE_MAX`], log-gamma above.
pub fn log_factorial(n: u64) -> f64 {
    if n <= LOG_FACTORIAL_TABLE_MAX {
        return log_factorial_table()[n as usize];
    }
    log_gamma(n as f64 + 1.0)
}

/// log(n choose k); NEG_INFINITY when k > n.
pub fn log_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    log_factorial(n) - log_factorial(k) - log_factorial(n - k)
}

/// Exponentiate a log-probability, mapping NaN to 0.
///
/// Callers use this at the boundary where an infeasible configuration must
/// read as "zero likelihood" rather than propagate NaN.
pub fn exp_or_zero(log_p: f64) -> f64 {
    if log_p.is_nan() {
        return 0.0;
    }
    log_p.exp()
}

/// Interpret a grid value as a head count.
///
/// `None` for negative, non-finite or non-integral values.
pub fn as_count(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}
