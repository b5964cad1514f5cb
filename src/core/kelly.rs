//! Kelly Criterion Betting
//!
//! Bet sizing and wealth simulation for repeated binary bets.
//!
//! The Kelly criterion formula:
//!     f* = (b*p - q) / b = (p*odds - 1) / (odds - 1)
//!
//! Where:
//!     f* = fraction of wealth to bet
//!     b = odds - 1 (net odds)
//!     p = probability of winning
//!     q = 1 - p (probability of losing)
//!     odds = decimal odds (2.0 for an even-money bet)
//!
//! For even money this reduces to f* = 2p - 1.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{validate_fraction, validate_outcomes, validate_probability, SimResult};
use crate::models::{Termination, WealthTrajectory};

/// Decimal odds of an even-money bet (stake returned plus an equal win)
pub const EVEN_MONEY_ODDS: f64 = 2.0;

/// Calculate Kelly fraction for a single bet at arbitrary decimal odds
///
/// # Arguments
/// * `probability` - Estimated probability of winning (0-1)
/// * `odds` - Decimal odds (e.g., 5.0 = 5x return)
///
/// # Returns
/// Kelly fraction (can be negative if EV < 1)
///
/// # Examples
/// ```
/// use quantsim::core::kelly::calculate_kelly_fraction;
/// let kelly = calculate_kelly_fraction(0.25, 5.0); // EV = 1.25
/// assert!((kelly - 0.0625).abs() < 0.0001);
/// ```
pub fn calculate_kelly_fraction(probability: f64, odds: f64) -> f64 {
    if odds <= 1.0 {
        return 0.0;
    }

    // f* = (p * odds - 1) / (odds - 1)
    (probability * odds - 1.0) / (odds - 1.0)
}

/// Even-money Kelly fraction, clamped at zero: `max(0, 2p - 1)`
///
/// # Examples
/// ```
/// use quantsim::core::kelly::kelly_fraction;
/// assert!((kelly_fraction(0.6) - 0.2).abs() < 1e-12);
/// assert_eq!(kelly_fraction(0.4), 0.0);
/// ```
pub fn kelly_fraction(p_hat: f64) -> f64 {
    calculate_kelly_fraction(p_hat, EVEN_MONEY_ODDS).max(0.0)
}

/// Betting policy: how much of current wealth to stake each round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BettingPolicy {
    /// Full Kelly stake for an estimated win probability
    FullKelly { p_hat: f64 },
    /// Half of the Kelly stake
    HalfKelly { p_hat: f64 },
    /// Constant fraction of wealth
    Fixed { fraction: f64 },
    /// Never bet
    NoBet,
}

impl BettingPolicy {
    /// Fraction of current wealth staked each round
    pub fn fraction(&self) -> f64 {
        match *self {
            BettingPolicy::FullKelly { p_hat } => kelly_fraction(p_hat),
            BettingPolicy::HalfKelly { p_hat } => 0.5 * kelly_fraction(p_hat),
            BettingPolicy::Fixed { fraction } => fraction,
            BettingPolicy::NoBet => 0.0,
        }
    }

    /// Display name
    pub fn name(&self) -> String {
        match *self {
            BettingPolicy::FullKelly { .. } => "Full Kelly".to_string(),
            BettingPolicy::HalfKelly { .. } => "Half Kelly".to_string(),
            BettingPolicy::Fixed { fraction } => {
                format!("Fixed {}%", (fraction * 10_000.0).round() / 100.0)
            }
            BettingPolicy::NoBet => "No Bet".to_string(),
        }
    }

    /// Check the policy resolves to a usable fraction
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            BettingPolicy::FullKelly { p_hat } | BettingPolicy::HalfKelly { p_hat } => {
                validate_probability("p_hat", p_hat)
            }
            BettingPolicy::Fixed { fraction } => validate_fraction(fraction),
            BettingPolicy::NoBet => Ok(()),
        }
    }

    /// Run this policy over an outcome sequence
    pub fn simulate(&self, outcomes: &[u8]) -> SimResult<WealthTrajectory> {
        self.validate()?;
        simulate_wealth(outcomes, self.fraction())
    }

    /// The standard comparison set for an estimated win probability
    pub fn standard_set(p_hat: f64) -> Vec<BettingPolicy> {
        vec![
            BettingPolicy::FullKelly { p_hat },
            BettingPolicy::HalfKelly { p_hat },
            BettingPolicy::Fixed { fraction: 0.05 },
            BettingPolicy::NoBet,
        ]
    }
}

/// Simulate wealth growth staking `fraction` of current wealth on every outcome
///
/// Wealth starts at 1.0. A 1 wins the stake, a 0 loses it. The path stops at the
/// first round where wealth is at or below zero (ruin).
///
/// # Examples
/// ```
/// use quantsim::core::kelly::simulate_wealth;
/// let trajectory = simulate_wealth(&[1, 1, 0, 1], 0.5).unwrap();
/// assert_eq!(trajectory.path, vec![1.0, 1.5, 2.25, 1.125, 1.6875]);
/// ```
pub fn simulate_wealth(outcomes: &[u8], fraction: f64) -> SimResult<WealthTrajectory> {
    validate_fraction(fraction)?;
    validate_outcomes(outcomes)?;

    let mut wealth = 1.0;
    let mut history = Vec::with_capacity(outcomes.len() + 1);
    history.push(wealth);

    for (i, &y) in outcomes.iter().enumerate() {
        let stake = fraction * wealth;
        if y == 1 {
            wealth += stake;
        } else {
            wealth -= stake;
        }
        history.push(wealth);

        if wealth <= 0.0 {
            debug!(round = i + 1, fraction, "wealth exhausted");
            return Ok(WealthTrajectory {
                path: history,
                termination: Termination::Ruin { round: i + 1 },
            });
        }
    }

    Ok(WealthTrajectory {
        path: history,
        termination: Termination::Horizon,
    })
}
