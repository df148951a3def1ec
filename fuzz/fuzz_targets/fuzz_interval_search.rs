//! Fuzz target for the HPDI search.
//!
//! Arbitrary grids, densities and coverages must yield an interval or a
//! typed error. Unordered or non-finite grids are rejected by the finder.
//! A returned interval always meets the requested coverage.

#![no_main]

use arbitrary::Arbitrary;
use cr_core::inference::IntervalFinder;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    grid: Vec<f64>,
    density: Vec<f64>,
    coverage: f64,
}

fuzz_target!(|input: Input| {
    // The search is quadratic; long inputs only slow the fuzzer down.
    if input.grid.len() > 256 {
        return;
    }
    if let Ok(interval) = IntervalFinder::new().find(&input.grid, &input.density, input.coverage) {
        assert!(interval.coverage >= input.coverage - 1e-9);
        assert!(interval.lower < interval.upper);
    }
});
