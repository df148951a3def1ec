//! Property-based tests for grid posterior and interval invariants.

use cr_core::inference::{
    update, CaptureStage, Distribution, Grid, GridPosterior, IntervalFinder, Likelihood, Product,
    TwoTestSweep, TwoTestTable,
};
use proptest::prelude::*;

/// A stage that is feasible for some `N` on the 1..=200 grid.
fn stage_strategy() -> impl Strategy<Value = CaptureStage> {
    (1u64..=40, 1u64..=40)
        .prop_flat_map(|(marked, sample)| {
            (Just(marked), Just(sample), 0u64..=marked.min(sample))
        })
        .prop_map(|(marked, sample, recaptured)| CaptureStage::new(marked, sample, recaptured))
}

fn weights_strategy(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=10.0, len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn posterior_sums_to_one(stage in stage_strategy(), prior in weights_strategy(200)) {
        let grid = Grid::integers(1, 200).unwrap();
        // Guarantee overlap between prior and likelihood support.
        let mut prior = prior;
        prior[199] += 1.0;
        let posterior = update(&grid, &prior, &stage.likelihood()).unwrap();
        let sum = posterior.total();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
        prop_assert!(posterior.masses().iter().all(|m| *m >= 0.0 && m.is_finite()));
    }

    #[test]
    fn hypergeometric_support(stage in stage_strategy(), n in 0u64..=120) {
        let l = stage.likelihood().likelihood(n as f64);
        let infeasible =
            n < stage.marked || stage.sample_size - stage.recaptured > n - stage.marked;
        if infeasible {
            prop_assert_eq!(l, 0.0);
        } else {
            prop_assert!((0.0..=1.0).contains(&l), "l={l}");
        }
    }

    #[test]
    fn prior_zero_stays_zero(stage in stage_strategy(), cut in 1usize..199) {
        let grid = Grid::integers(1, 200).unwrap();
        let prior: Vec<f64> = (0..200).map(|i| if i < cut { 0.0 } else { 1.0 }).collect();
        if let Ok(posterior) = update(&grid, &prior, &stage.likelihood()) {
            prop_assert!(posterior.masses()[..cut].iter().all(|m| *m == 0.0));
        }
    }

    #[test]
    fn chained_updates_match_product(a in stage_strategy(), b in stage_strategy()) {
        let prior = vec![1.0; 200];
        let posterior = GridPosterior::new(Grid::integers(1, 200).unwrap());
        let chained = posterior
            .update(&prior, &a.likelihood())
            .and_then(|p| posterior.update(p.masses(), &b.likelihood()));
        let joint = posterior.update(&prior, &Product::new(a.likelihood(), b.likelihood()));
        match (chained, joint) {
            (Ok(chained), Ok(joint)) => {
                for (x, y) in chained.masses().iter().zip(joint.masses()) {
                    prop_assert!((x - y).abs() < 1e-9, "{x} vs {y}");
                }
            }
            (Err(_), Err(_)) => {}
            (c, j) => {
                prop_assert!(false, "chained={c:?} joint={j:?}");
            }
        }
    }

    #[test]
    fn interval_meets_requested_coverage(
        weights in prop::collection::vec(0.0f64..=1.0, 2..60),
        coverage in 0.05f64..=1.0,
    ) {
        let grid = Grid::integers(0, weights.len() as i64 - 1).unwrap();
        let Some(dist) = Distribution::from_weights(&weights) else {
            return Ok(());
        };
        if let Ok(interval) = IntervalFinder::new().find_in(&grid, &dist, coverage) {
            prop_assert!(interval.coverage >= coverage - 1e-9);
            prop_assert!(interval.lower < interval.upper);
            prop_assert!((interval.width - (interval.upper - interval.lower)).abs() < 1e-12);
        }
    }

    #[test]
    fn full_coverage_spans_the_grid(inner in prop::collection::vec(0.01f64..=1.0, 1..40)) {
        // Zero mass on the first point, positive mass everywhere else.
        let mut weights = vec![0.0];
        weights.extend(inner);
        let grid = Grid::integers(0, weights.len() as i64 - 1).unwrap();
        let dist = Distribution::from_weights(&weights).unwrap();
        let interval = IntervalFinder::new().find_in(&grid, &dist, 1.0).unwrap();
        prop_assert_eq!(interval.lower, grid.first());
        prop_assert_eq!(interval.upper, grid.last());
    }

    #[test]
    fn two_test_excludes_populations_below_found(
        k10 in 0u64..=8,
        k01 in 0u64..=8,
        k11 in 1u64..=4,
    ) {
        let table = TwoTestTable::new(k10, k01, k11);
        let population = Grid::integers(1, 60).unwrap();
        let detection = Grid::linspace(0.0, 1.0, 6).unwrap();
        let flat_n = vec![1.0; population.len()];
        let flat_p = vec![1.0; detection.len()];
        let result = TwoTestSweep {
            population: &population,
            population_prior: &flat_n,
            detection: &detection,
            p1_prior: &flat_p,
            p2_prior: &flat_p,
        }
        .run(&table)
        .unwrap();
        let found = table.found() as usize;
        prop_assert!(result.population.masses()[..found - 1].iter().all(|m| *m == 0.0));
        prop_assert!((result.population.total() - 1.0).abs() < 1e-9);
        prop_assert!((result.p1.total() - 1.0).abs() < 1e-9);
        prop_assert!(result.joint_map.0 >= found as f64);
    }
}
