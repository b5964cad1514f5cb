//! quantsim - Seedable probability simulations
//!
//! This library provides:
//! - Deterministic binary outcome generation with an optional regime switch
//! - Kelly criterion betting simulations with ruin detection
//! - Forecast models scored by Brier score, log loss and calibration curves
//! - Value-of-information analysis for a two-action decision problem
//! - Descriptive statistics and histograms of normal samples
//!
//! # Example
//!
//! ```
//! use quantsim::config::KellyConfig;
//! use quantsim::simulation::KellyExperiment;
//!
//! let result = KellyExperiment::new(KellyConfig::default()).run().unwrap();
//! for policy in &result.policies {
//!     println!("{}: final wealth {:.3}", policy.name, policy.summary.final_wealth);
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod simulation;

// Re-export commonly used types
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use models::{CalibrationCurve, OutcomeSequence, ScoreRecord, Termination, WealthTrajectory};
