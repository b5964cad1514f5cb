use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered sequence of Bernoulli draws (0/1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSequence {
    pub outcomes: Vec<u8>,
}

impl OutcomeSequence {
    pub fn new(outcomes: Vec<u8>) -> Self {
        Self { outcomes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of 1s in the sequence
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|&&y| y == 1).count()
    }

    /// Empirical frequency of 1s (0.0 for an empty sequence)
    pub fn frequency(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.successes() as f64 / self.outcomes.len() as f64
        }
    }

    /// Split into (train, test) at `index`
    pub fn split_at(&self, index: usize) -> (&[u8], &[u8]) {
        self.outcomes.split_at(index.min(self.outcomes.len()))
    }
}

impl From<Vec<u8>> for OutcomeSequence {
    fn from(outcomes: Vec<u8>) -> Self {
        Self::new(outcomes)
    }
}

/// How a wealth simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Every outcome was played
    Horizon,
    /// Wealth reached zero or below after `round` (1-based)
    Ruin { round: usize },
}

/// Wealth path starting at 1.0, one entry per round played
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WealthTrajectory {
    pub path: Vec<f64>,
    pub termination: Termination,
}

impl WealthTrajectory {
    /// Number of rounds actually played
    pub fn rounds(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_ruined(&self) -> bool {
        matches!(self.termination, Termination::Ruin { .. })
    }

    /// Final wealth, never negative
    pub fn final_wealth(&self) -> f64 {
        self.path.last().copied().unwrap_or(1.0).max(0.0)
    }
}

/// Binned mean forecast vs. mean observed frequency (non-empty bins only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub mean_predicted: Vec<f64>,
    pub mean_observed: Vec<f64>,
}

impl CalibrationCurve {
    pub fn len(&self) -> usize {
        self.mean_predicted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean_predicted.is_empty()
    }

    /// Iterate over (predicted, observed) points
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mean_predicted
            .iter()
            .copied()
            .zip(self.mean_observed.iter().copied())
    }
}

/// Scores for one forecast model on one test set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub brier: f64,
    pub log_loss: f64,
    pub calibration: CalibrationCurve,
    /// Expected calibration error over the same bins
    pub ece: f64,
}

impl ScoreRecord {
    /// Scalar scores keyed by name ("brier", "log_loss")
    pub fn scores(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([("brier", self.brier), ("log_loss", self.log_loss)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_sequence_split() {
        let seq = OutcomeSequence::new(vec![1, 0, 1, 1, 0]);
        let (train, test) = seq.split_at(2);
        assert_eq!(train, &[1, 0]);
        assert_eq!(test, &[1, 1, 0]);
        assert_eq!(seq.successes(), 3);
        assert!((seq.frequency() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_trajectory_final_wealth_clamped() {
        let trajectory = WealthTrajectory {
            path: vec![1.0, -0.5],
            termination: Termination::Ruin { round: 1 },
        };
        assert_eq!(trajectory.final_wealth(), 0.0);
        assert_eq!(trajectory.rounds(), 1);
        assert!(trajectory.is_ruined());
    }

    #[test]
    fn test_termination_serializes_with_tag() {
        let json = serde_json::to_string(&Termination::Ruin { round: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"ruin","round":3}"#);
    }

    #[test]
    fn test_score_record_keys() {
        let record = ScoreRecord {
            brier: 0.25,
            log_loss: 0.69,
            calibration: CalibrationCurve::default(),
            ece: 0.0,
        };
        let scores = record.scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["brier"], 0.25);
        assert_eq!(scores["log_loss"], 0.69);
    }
}
