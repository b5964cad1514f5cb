//! Run parameters for each experiment
//!
//! Every experiment reads a plain config struct. Configs are validated once,
//! before anything is generated, and can be loaded from a JSON file where any
//! missing field keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::scoring::DEFAULT_CALIBRATION_BINS;
use crate::error::{
    validate_length, validate_open_probability, validate_probability, validate_switch_point,
    SimError, SimResult,
};

/// Kelly betting experiment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KellyConfig {
    /// Number of bets
    pub n: usize,
    /// True win probability used to generate outcomes
    pub p_true: f64,
    /// Believed win probability used to size Kelly bets
    pub p_hat: f64,
    /// Fraction staked by the fixed-fraction policy
    pub fixed_fraction: f64,
    pub seed: u64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            n: 300,
            p_true: 0.55,
            p_hat: 0.60, // overestimated edge
            fixed_fraction: 0.05,
            seed: 42,
        }
    }
}

impl KellyConfig {
    pub fn validate(&self) -> SimResult<()> {
        validate_length("Number of bets", self.n)?;
        validate_probability("p_true", self.p_true)?;
        validate_probability("p_hat", self.p_hat)?;
        validate_probability("Fixed fraction", self.fixed_fraction)?;
        Ok(())
    }
}

/// Calibration study configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Length of the binary stream
    pub n: usize,
    /// Probability before the switch point
    pub p1: f64,
    /// Probability from the switch point on
    pub p2: f64,
    /// Index where the regime changes; also the train/test split
    pub switch_point: usize,
    pub bins: usize,
    pub seed: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            n: 1000,
            p1: 0.38,
            p2: 0.56,
            switch_point: 500,
            bins: DEFAULT_CALIBRATION_BINS,
            seed: 50,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> SimResult<()> {
        validate_length("Stream length", self.n)?;
        validate_probability("p1", self.p1)?;
        validate_probability("p2", self.p2)?;
        validate_switch_point(self.switch_point, self.n)?;
        validate_length("Calibration bins", self.bins)?;
        Ok(())
    }
}

/// Value-of-information configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiConfig {
    /// Prior probability of the good state
    pub p_prior: f64,
    /// Signal accuracy
    pub q: f64,
}

impl Default for VoiConfig {
    fn default() -> Self {
        Self {
            p_prior: 0.5,
            q: 0.8,
        }
    }
}

impl VoiConfig {
    pub fn validate(&self) -> SimResult<()> {
        validate_open_probability("Prior probability", self.p_prior)?;
        validate_open_probability("Signal accuracy", self.q)?;
        Ok(())
    }
}

/// Random sample statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub bins: usize,
    /// Fixed seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            n: 10_000,
            mean: 50.0,
            std_dev: 10.0,
            bins: 50,
            seed: None,
        }
    }
}

impl StatsConfig {
    pub fn validate(&self) -> SimResult<()> {
        validate_length("Sample size", self.n)?;
        validate_length("Histogram bins", self.bins)?;
        if !self.mean.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "Mean must be finite, got {}",
                self.mean
            )));
        }
        if !self.std_dev.is_finite() || self.std_dev <= 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "Standard deviation must be positive, got {}",
                self.std_dev
            )));
        }
        Ok(())
    }
}

/// All experiment configs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub kelly: KellyConfig,
    pub calibration: CalibrationConfig,
    pub voi: VoiConfig,
    pub stats: StatsConfig,
}

impl SimConfig {
    /// Load from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.kelly.validate()?;
        self.calibration.validate()?;
        self.voi.validate()?;
        self.stats.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimConfig::from_json(r#"{"kelly": {"n": 50}, "voi": {"q": 0.3}}"#).unwrap();
        assert_eq!(config.kelly.n, 50);
        assert_eq!(config.kelly.seed, 42);
        assert_eq!(config.voi.q, 0.3);
        assert_eq!(config.calibration.switch_point, 500);
        assert_eq!(config.stats.seed, None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SimConfig::from_json("{not json"),
            Err(SimError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SimConfig::load("/definitely/not/here.json"),
            Err(SimError::Io(_))
        ));
    }

    #[test]
    fn test_calibration_switch_point_bounds() {
        let mut config = CalibrationConfig::default();
        config.switch_point = 0;
        assert!(config.validate().is_err());
        config.switch_point = config.n;
        assert!(config.validate().is_err());
        config.switch_point = config.n - 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_kelly_rejects_zero_length() {
        let config = KellyConfig {
            n: 0,
            ..KellyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_voi_requires_open_interval() {
        let config = VoiConfig {
            p_prior: 1.0,
            q: 0.8,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stats_rejects_non_positive_std() {
        let config = StatsConfig {
            std_dev: 0.0,
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
