//! Core evaluators: betting, forecasting, scoring and decision analysis

pub mod forecast;
pub mod kelly;
pub mod scoring;
pub mod voi;

// Re-export commonly used types
pub use forecast::{ForecastModel, Forecaster};
pub use kelly::{calculate_kelly_fraction, kelly_fraction, simulate_wealth, BettingPolicy};
pub use scoring::{brier_score, calibration_curve, log_loss};
pub use voi::{
    evaluate_voi, expected_value, normalize_signal, optimal_action, posterior,
    value_of_information, Action, VoiReport,
};
