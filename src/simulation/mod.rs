//! Simulation engine: outcome generation, experiment runners and summaries

pub mod generator;
pub mod metrics;
pub mod simulator;
pub mod stats;

pub use generator::{generate, OutcomeGenerator, RegimeSwitch};
pub use metrics::{summarize, WealthSummary};
pub use simulator::{
    CalibrationExperiment, CalibrationResult, KellyExperiment, KellyResult, ModelResult,
    PolicyResult,
};
pub use stats::{run_stats, Histogram, SampleStats, StatsReport};
