//! Regression values for the reference capture-recapture scenarios.
//!
//! Pinned numbers come from an independent double-precision evaluation of
//! the same grids, priors and likelihoods.

use cr_core::inference::{
    map_estimate, update, CaptureStage, Grid, GridPosterior, IntervalFinder, Likelihood,
    PosteriorSummary, TwoTestSweep, TwoTestTable,
};

fn window_prior(grid: &Grid, lower: f64, upper: f64) -> Vec<f64> {
    grid.values()
        .iter()
        .map(|v| if (lower..=upper).contains(v) { 1.0 } else { 0.0 })
        .collect()
}

fn two_test_run(n_max: i64) -> cr_core::inference::TwoTestPosterior {
    let population = Grid::integers(1, n_max).unwrap();
    let detection = Grid::linspace(0.0, 1.0, 11).unwrap();
    let flat_n = vec![1.0; population.len()];
    let flat_p = vec![1.0; detection.len()];
    TwoTestSweep {
        population: &population,
        population_prior: &flat_n,
        detection: &detection,
        p1_prior: &flat_p,
        p2_prior: &flat_p,
    }
    .run(&TwoTestTable::new(10, 2, 2))
    .unwrap()
}

mod single_stage {
    use super::*;

    fn posterior() -> (Grid, cr_core::inference::Distribution) {
        let grid = Grid::integers(1, 200).unwrap();
        let prior = window_prior(&grid, 2.0, 199.0);
        let stage = CaptureStage::new(14, 12, 2);
        let posterior = update(&grid, &prior, &stage.likelihood()).unwrap();
        (grid, posterior)
    }

    #[test]
    fn likelihood_peaks_at_lincoln_petersen() {
        let l = CaptureStage::new(14, 12, 2).likelihood();
        assert!((l.likelihood(82.0) - 0.31936).abs() < 1e-5);
        assert!((l.likelihood(83.0) - 0.319490).abs() < 1e-6);
        assert!((l.likelihood(84.0) - 0.319490).abs() < 1e-6);
        assert!((l.likelihood(85.0) - 0.319367).abs() < 1e-6);
    }

    #[test]
    fn map_is_at_the_tie() {
        let (grid, posterior) = posterior();
        let map = map_estimate(grid.values(), posterior.masses()).unwrap();
        assert!(map == 83.0 || map == 84.0, "map={map}");
    }

    #[test]
    fn credible_intervals() {
        let (grid, posterior) = posterior();
        let finder = IntervalFinder::new();
        for (coverage, lower, upper) in [(0.95, 47.0, 196.0), (0.90, 48.0, 185.0), (0.50, 59.0, 125.0)] {
            let interval = finder.find_in(&grid, &posterior, coverage).unwrap();
            assert_eq!((interval.lower, interval.upper), (lower, upper), "coverage {coverage}");
            assert!(interval.coverage >= coverage - 1e-9);
        }
    }

    #[test]
    fn posterior_mean() {
        let (grid, posterior) = posterior();
        let summary = PosteriorSummary::compute(&grid, &posterior, 0.95).unwrap();
        assert!((summary.mean - 114.19).abs() < 0.01, "mean={}", summary.mean);
        assert!(summary.median > summary.map);
    }

    #[test]
    fn zero_prior_mass_outside_window() {
        let (_, posterior) = posterior();
        assert_eq!(posterior.masses()[0], 0.0);
        assert_eq!(posterior.masses()[199], 0.0);
    }
}

mod two_stage {
    use super::*;

    #[test]
    fn sequential_history() {
        let grid = Grid::integers(1, 200).unwrap();
        let prior = vec![1.0; grid.len()];
        let stages = [
            CaptureStage::new(0, 14, 0).likelihood(),
            CaptureStage::new(14, 12, 2).likelihood(),
        ];
        let posteriors = GridPosterior::new(grid.clone())
            .update_all(&prior, &stages)
            .unwrap();
        assert_eq!(posteriors.len(), 2);

        // The first catch only rules out N < 14.
        let first = &posteriors[0];
        assert!(first.masses()[..13].iter().all(|m| *m == 0.0));
        assert!((first.masses()[13] - 1.0 / 187.0).abs() < 1e-12);

        let summary = PosteriorSummary::compute(&grid, &posteriors[1], 0.95).unwrap();
        assert_eq!(summary.interval.lower, 47.0);
        assert_eq!(summary.interval.upper, 197.0);
        assert!((summary.mean - 114.53).abs() < 0.01, "mean={}", summary.mean);
    }
}

mod two_test {
    use super::*;

    #[test]
    fn population_marginal() {
        let result = two_test_run(200);
        let grid = Grid::integers(1, 200).unwrap();
        assert!((result.population.total() - 1.0).abs() < 1e-9);
        // N = 13 is below the 14 distinct individuals found.
        assert_eq!(result.population.masses()[12], 0.0);
        assert!(result.population.masses()[13] > 0.0);

        let summary = PosteriorSummary::compute(&grid, &result.population, 0.95).unwrap();
        assert_eq!(summary.map, 18.0);
        assert!(summary.map >= 14.0);
        assert_eq!(summary.interval.lower, 13.0);
        assert_eq!(summary.interval.upper, 52.0);
    }

    #[test]
    fn detection_marginals_are_normalized() {
        let result = two_test_run(200);
        for marginal in [&result.p1, &result.p2] {
            assert_eq!(marginal.len(), 11);
            assert!((marginal.total() - 1.0).abs() < 1e-9);
            // k10 > 0 and k01 > 0 rule out both endpoints.
            assert_eq!(marginal.masses()[0], 0.0);
            assert_eq!(marginal.masses()[10], 0.0);
        }
    }

    #[test]
    fn joint_map_on_small_grid() {
        let result = two_test_run(60);
        assert_eq!(result.joint_map.0, 20.0);
        assert!((result.joint_map.1 - 0.6).abs() < 1e-12);
        assert!((result.joint_map.2 - 0.2).abs() < 1e-12);
    }
}
