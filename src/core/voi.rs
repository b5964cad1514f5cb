//! Value of Information
//!
//! Two actions, two world states (good / bad) and a noisy binary signal that
//! reports the true state with accuracy `q`.
//!
//! Payoffs:
//!     action A: +10 if good, -5 if bad
//!     action B:  +2 if good, +1 if bad

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{validate_open_probability, validate_probability, SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    A,
    B,
}

impl Action {
    /// (payoff if good, payoff if bad)
    pub fn payoffs(&self) -> (f64, f64) {
        match self {
            Action::A => (10.0, -5.0),
            Action::B => (2.0, 1.0),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::A => write!(f, "A"),
            Action::B => write!(f, "B"),
        }
    }
}

impl FromStr for Action {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Action::A),
            "B" | "b" => Ok(Action::B),
            other => Err(SimError::UnknownAction(other.to_string())),
        }
    }
}

/// Expected payoff of `action` when the good state has probability `p_good`
pub fn expected_value(action: Action, p_good: f64) -> f64 {
    let (good, bad) = action.payoffs();
    p_good * good + (1.0 - p_good) * bad
}

/// Action with the highest expected value; A wins ties
pub fn optimal_action(p_good: f64) -> Action {
    if expected_value(Action::A, p_good) >= expected_value(Action::B, p_good) {
        Action::A
    } else {
        Action::B
    }
}

/// Bayesian update of `p_prior` after observing a signal of accuracy `q`
///
/// # Examples
/// ```
/// use quantsim::core::voi::posterior;
/// let p = posterior(0.5, true, 0.8).unwrap();
/// assert!((p - 0.8).abs() < 1e-12);
/// ```
pub fn posterior(p_prior: f64, signal_good: bool, q: f64) -> SimResult<f64> {
    let (numerator, denominator) = if signal_good {
        let num = q * p_prior;
        (num, num + (1.0 - q) * (1.0 - p_prior))
    } else {
        let num = (1.0 - q) * p_prior;
        (num, num + q * (1.0 - p_prior))
    };

    if denominator == 0.0 || !denominator.is_finite() {
        return Err(SimError::DegenerateComputation(format!(
            "Posterior undefined for prior {} and accuracy {} (signal_good = {})",
            p_prior, q, signal_good
        )));
    }

    Ok(numerator / denominator)
}

/// Probability of receiving a good signal
pub fn signal_probability(p_prior: f64, q: f64) -> f64 {
    q * p_prior + (1.0 - q) * (1.0 - p_prior)
}

/// Expected value of acting optimally after the signal, minus acting on the prior alone
///
/// Each signal branch is weighted by its probability `q·p + (1-q)(1-p)`, not by the prior.
pub fn value_of_information(p_prior: f64, q: f64) -> SimResult<f64> {
    let base_ev = expected_value(optimal_action(p_prior), p_prior);
    Ok(ev_with_signal(p_prior, q)? - base_ev)
}

fn ev_with_signal(p_prior: f64, q: f64) -> SimResult<f64> {
    let p_signal_good = signal_probability(p_prior, q);

    let mut total = 0.0;
    for (signal_good, weight) in [(true, p_signal_good), (false, 1.0 - p_signal_good)] {
        // A signal that can never arrive contributes nothing
        if weight <= 0.0 {
            continue;
        }
        let p_post = posterior(p_prior, signal_good, q)?;
        total += weight * expected_value(optimal_action(p_post), p_post);
    }

    Ok(total)
}

/// Signal accuracy after normalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalAccuracy {
    pub q: f64,
    /// The raw accuracy was below 0.5 and the signal's meaning was inverted
    pub flipped: bool,
}

/// Map anti-informative signals (q < 0.5) onto their informative mirror
pub fn normalize_signal(q: f64) -> SignalAccuracy {
    if q < 0.5 {
        SignalAccuracy {
            q: 1.0 - q,
            flipped: true,
        }
    } else {
        SignalAccuracy { q, flipped: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiReport {
    pub p_prior: f64,
    pub raw_q: f64,
    /// Effective accuracy used for evaluation
    pub q: f64,
    pub flipped: bool,
    pub base_action: Action,
    pub base_ev: f64,
    pub ev_with_signal: f64,
    pub value: f64,
    /// Prior at which A and B have equal expected value
    pub indifference_prior: f64,
}

/// Validate inputs, normalize the signal and compute the value of information
pub fn evaluate_voi(p_prior: f64, q: f64) -> SimResult<VoiReport> {
    validate_open_probability("Prior probability", p_prior)?;
    validate_open_probability("Signal accuracy", q)?;

    let signal = normalize_signal(q);
    if signal.flipped {
        warn!(raw_q = q, effective_q = signal.q, "Signal is anti-informative, inverting it");
    }

    let base_action = optimal_action(p_prior);
    let base_ev = expected_value(base_action, p_prior);
    let with_signal = ev_with_signal(p_prior, signal.q)?;

    Ok(VoiReport {
        p_prior,
        raw_q: q,
        q: signal.q,
        flipped: signal.flipped,
        base_action,
        base_ev,
        ev_with_signal: with_signal,
        value: with_signal - base_ev,
        indifference_prior: indifference_prior()?,
    })
}

/// Prior at which both actions have equal expected value
pub fn indifference_prior() -> SimResult<f64> {
    let (a_good, a_bad) = Action::A.payoffs();
    let (b_good, b_bad) = Action::B.payoffs();
    let slope = (a_good - a_bad) - (b_good - b_bad);
    if slope == 0.0 {
        return Err(SimError::DegenerateComputation(
            "Actions have parallel payoff lines".to_string(),
        ));
    }
    let p = (b_bad - a_bad) / slope;
    validate_probability("Indifference prior", p)?;
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_value() {
        assert!((expected_value(Action::A, 0.5) - 2.5).abs() < 1e-12);
        assert!((expected_value(Action::B, 0.5) - 1.5).abs() < 1e-12);
        assert_eq!(expected_value(Action::A, 1.0), 10.0);
        assert_eq!(expected_value(Action::B, 0.0), 1.0);
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("A".parse::<Action>().unwrap(), Action::A);
        assert_eq!(" b ".parse::<Action>().unwrap(), Action::B);
        assert!(matches!(
            "C".parse::<Action>(),
            Err(SimError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_indifference_prior_splits_actions() {
        let p = indifference_prior().unwrap();
        // 10p - 5(1-p) = 2p + (1-p)  =>  p = 6/14
        assert!((p - 6.0 / 14.0).abs() < 1e-12);
        assert_eq!(optimal_action(p + 1e-9), Action::A);
        assert_eq!(optimal_action(p - 1e-9), Action::B);
        assert_eq!(optimal_action(0.0), Action::B);
        assert_eq!(optimal_action(1.0), Action::A);
    }

    #[test]
    fn test_posterior_good_signal() {
        let p = posterior(0.5, true, 0.8).unwrap();
        assert!((p - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_posterior_bad_signal() {
        let p = posterior(0.5, false, 0.8).unwrap();
        assert!((p - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_posterior_degenerate() {
        // Perfect signal says "bad" but the prior is certain of "good"
        assert!(matches!(
            posterior(1.0, false, 1.0),
            Err(SimError::DegenerateComputation(_))
        ));
    }

    #[test]
    fn test_voi_uninformative_signal_is_zero() {
        let voi = value_of_information(0.5, 0.5).unwrap();
        assert!(voi.abs() < 1e-12);
    }

    #[test]
    fn test_voi_perfect_signal() {
        // Perfect info: 0.5 * 10 + 0.5 * 1 = 5.5, prior EV = 2.5
        let voi = value_of_information(0.5, 1.0).unwrap();
        assert!((voi - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_voi_non_negative() {
        for &p in &[0.1, 0.3, 0.43, 0.5, 0.7, 0.95] {
            for &q in &[0.5, 0.6, 0.75, 0.9, 0.99] {
                let voi = value_of_information(p, q).unwrap();
                assert!(voi >= -1e-12, "voi({}, {}) = {}", p, q, voi);
            }
        }
    }

    #[test]
    fn test_normalize_signal() {
        let s = normalize_signal(0.3);
        assert!(s.flipped);
        assert!((s.q - 0.7).abs() < 1e-12);

        let s = normalize_signal(0.5);
        assert!(!s.flipped);
        assert_eq!(s.q, 0.5);
    }

    #[test]
    fn test_evaluate_voi_flags_flip() {
        let report = evaluate_voi(0.5, 0.2).unwrap();
        assert!(report.flipped);
        assert!((report.q - 0.8).abs() < 1e-12);
        assert_eq!(report.raw_q, 0.2);

        let direct = value_of_information(0.5, 0.8).unwrap();
        assert!((report.value - direct).abs() < 1e-12);
        assert!((report.indifference_prior - 6.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_voi_rejects_boundaries() {
        assert!(matches!(
            evaluate_voi(0.0, 0.8),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            evaluate_voi(0.5, 1.0),
            Err(SimError::InvalidParameter(_))
        ));
    }
}
