//! Experiment Runners
//!
//! Wire the outcome generator to the evaluators for the betting and
//! calibration studies.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::generator::OutcomeGenerator;
use super::metrics::{summarize, WealthSummary};
use crate::config::{CalibrationConfig, KellyConfig};
use crate::core::forecast::{ForecastModel, Forecaster};
use crate::core::kelly::BettingPolicy;
use crate::error::{validate_length, validate_switch_point, SimResult};
use crate::models::{OutcomeSequence, ScoreRecord, WealthTrajectory};

/// Outcome of one betting policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResult {
    pub name: String,
    pub policy: BettingPolicy,
    pub fraction: f64,
    pub trajectory: WealthTrajectory,
    pub summary: WealthSummary,
}

/// Kelly experiment result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyResult {
    pub outcomes: OutcomeSequence,
    pub policies: Vec<PolicyResult>,
}

impl KellyResult {
    pub fn get(&self, name: &str) -> Option<&PolicyResult> {
        self.policies.iter().find(|p| p.name == name)
    }
}

/// Betting experiment: several policies over one shared outcome sequence
pub struct KellyExperiment {
    config: KellyConfig,
    policies: Vec<BettingPolicy>,
}

impl KellyExperiment {
    /// Full Kelly, Half Kelly, fixed fraction and no bet
    pub fn new(config: KellyConfig) -> Self {
        let policies = vec![
            BettingPolicy::FullKelly { p_hat: config.p_hat },
            BettingPolicy::HalfKelly { p_hat: config.p_hat },
            BettingPolicy::Fixed {
                fraction: config.fixed_fraction,
            },
            BettingPolicy::NoBet,
        ];
        Self { config, policies }
    }

    /// Replace the policy set
    #[must_use]
    pub fn with_policies(mut self, policies: Vec<BettingPolicy>) -> Self {
        self.policies = policies;
        self
    }

    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    pub fn run(&self) -> SimResult<KellyResult> {
        self.config.validate()?;
        for policy in &self.policies {
            policy.validate()?;
        }

        let outcomes = OutcomeGenerator::new(self.config.n, self.config.p_true)
            .with_seed(self.config.seed)
            .generate()?;
        debug!(
            n = outcomes.len(),
            wins = outcomes.successes(),
            "Generated betting outcomes"
        );

        self.evaluate(outcomes)
    }

    /// Run every policy over an existing outcome sequence
    pub fn evaluate(&self, outcomes: OutcomeSequence) -> SimResult<KellyResult> {
        let mut policies = Vec::with_capacity(self.policies.len());

        for policy in &self.policies {
            let trajectory = policy.simulate(outcomes.as_slice())?;
            let summary = summarize(&trajectory);

            if let Some(round) = summary.ruin_round {
                warn!(policy = %policy.name(), round, "Policy ruined");
            }

            policies.push(PolicyResult {
                name: policy.name(),
                policy: *policy,
                fraction: policy.fraction(),
                trajectory,
                summary,
            });
        }

        info!(policies = policies.len(), rounds = outcomes.len(), "Kelly experiment complete");

        Ok(KellyResult { outcomes, policies })
    }
}

/// Outcome of one forecast model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResult {
    pub name: String,
    pub forecaster: Forecaster,
    pub record: ScoreRecord,
}

/// Calibration study result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub train_len: usize,
    pub test_len: usize,
    pub train_frequency: f64,
    pub test_frequency: f64,
    pub models: Vec<ModelResult>,
}

impl CalibrationResult {
    pub fn get(&self, model: ForecastModel) -> Option<&ModelResult> {
        self.models.iter().find(|m| m.forecaster.model == model)
    }
}

/// Calibration study: fit before the regime switch, score after it
pub struct CalibrationExperiment {
    config: CalibrationConfig,
    models: Vec<ForecastModel>,
}

impl CalibrationExperiment {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            models: ForecastModel::ALL.to_vec(),
        }
    }

    #[must_use]
    pub fn with_models(mut self, models: Vec<ForecastModel>) -> Self {
        self.models = models;
        self
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn run(&self) -> SimResult<CalibrationResult> {
        self.config.validate()?;

        let outcomes = OutcomeGenerator::new(self.config.n, self.config.p1)
            .with_switch(self.config.p2, self.config.switch_point)
            .with_seed(self.config.seed)
            .generate()?;

        self.evaluate(&outcomes)
    }

    /// Split an existing sequence at the switch point and score every model
    pub fn evaluate(&self, outcomes: &OutcomeSequence) -> SimResult<CalibrationResult> {
        validate_switch_point(self.config.switch_point, outcomes.len())?;
        validate_length("Calibration bins", self.config.bins)?;

        let (train, test) = outcomes.split_at(self.config.switch_point);
        let train_seq = OutcomeSequence::new(train.to_vec());
        let test_seq = OutcomeSequence::new(test.to_vec());
        debug!(
            train = train.len(),
            test = test.len(),
            "Split stream at switch point"
        );

        let mut models = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let forecaster = model.fit(train)?;
            let predictions = forecaster.forecast(test.len());
            let record = ScoreRecord::evaluate(test, &predictions, self.config.bins)?;
            debug!(
                model = model.name(),
                brier = record.brier,
                log_loss = record.log_loss,
                "Scored model"
            );

            models.push(ModelResult {
                name: model.name().to_string(),
                forecaster,
                record,
            });
        }

        info!(models = models.len(), test = test.len(), "Calibration experiment complete");

        Ok(CalibrationResult {
            train_len: train.len(),
            test_len: test.len(),
            train_frequency: train_seq.frequency(),
            test_frequency: test_seq.frequency(),
            models,
        })
    }
}
