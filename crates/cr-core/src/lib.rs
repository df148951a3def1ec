//! Capture-recapture core library.
//!
//! This library provides:
//! - Grid posteriors, likelihood evaluators and HPDI search (`inference`)
//! - The configuration-to-report pipeline (`analysis`)
//! - Synthetic capture histories (`simulate`)
//! - Configuration loading, logging, exit codes and output rendering
//!
//! The binary entry point is in `main.rs`.

pub mod analysis;
pub mod config;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod output;
pub mod schema;
pub mod simulate;
