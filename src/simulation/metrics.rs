//! Wealth Metrics
//!
//! Summary statistics of a wealth trajectory: growth, peak and drawdown.

use serde::{Deserialize, Serialize};

use crate::models::{Termination, WealthTrajectory};

/// Summary of one wealth trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WealthSummary {
    pub rounds: usize,
    pub final_wealth: f64,
    pub peak_wealth: f64,
    /// Largest fall from a running peak, as a fraction of that peak
    pub max_drawdown: f64,
    /// Mean log growth per round; `None` once ruined
    pub log_growth_rate: Option<f64>,
    pub ruined: bool,
    pub ruin_round: Option<usize>,
}

impl Default for WealthSummary {
    fn default() -> Self {
        Self {
            rounds: 0,
            final_wealth: 1.0,
            peak_wealth: 1.0,
            max_drawdown: 0.0,
            log_growth_rate: None,
            ruined: false,
            ruin_round: None,
        }
    }
}

/// Summarize a wealth trajectory
pub fn summarize(trajectory: &WealthTrajectory) -> WealthSummary {
    if trajectory.path.is_empty() {
        return WealthSummary::default();
    }

    let rounds = trajectory.rounds();
    let final_wealth = trajectory.final_wealth();

    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    for &value in &trajectory.path {
        let value = value.max(0.0);
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - value) / peak);
        }
    }

    let ruin_round = match trajectory.termination {
        Termination::Ruin { round } => Some(round),
        Termination::Horizon => None,
    };

    let log_growth_rate = if ruin_round.is_none() && rounds > 0 && final_wealth > 0.0 {
        Some(final_wealth.ln() / rounds as f64)
    } else {
        None
    };

    WealthSummary {
        rounds,
        final_wealth,
        peak_wealth: peak,
        max_drawdown,
        log_growth_rate,
        ruined: ruin_round.is_some(),
        ruin_round,
    }
}
