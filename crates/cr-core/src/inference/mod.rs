//! Inference engine modules.

pub mod grid;
pub mod interval;
pub mod likelihood;
pub mod posterior;
pub mod summary;

pub use grid::{Distribution, Grid, GridError};
pub use interval::{map_estimate, Interval, IntervalError, IntervalFinder, COVERAGE_TOLERANCE};
pub use likelihood::{
    CaptureStage, Hypergeometric, Likelihood, Observation, Product, TwoTest, TwoTestTable,
};
pub use posterior::{update, GridPosterior, PosteriorError};
pub use summary::PosteriorSummary;
pub use two_test::{TwoTestPosterior, TwoTestSweep};
