//! Forecast models fitted on a training window of binary outcomes

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Offset added to the training mean by [`ForecastModel::MisSpecified`]
pub const MIS_SPECIFIED_OFFSET: f64 = 0.30;

/// Predictions issued by [`ForecastModel::Overconfident`]
pub const OVERCONFIDENT_HIGH: f64 = 0.95;
pub const OVERCONFIDENT_LOW: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    /// Training mean for every future trial
    WellSpecified,
    /// Training mean plus a fixed offset, clamped to [0, 1]
    MisSpecified,
    /// 0.95 or 0.05 depending on which side of 0.5 the training mean falls
    Overconfident,
}

impl ForecastModel {
    pub const ALL: [ForecastModel; 3] = [
        ForecastModel::WellSpecified,
        ForecastModel::MisSpecified,
        ForecastModel::Overconfident,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ForecastModel::WellSpecified => "Well Specified",
            ForecastModel::MisSpecified => "Mis Specified",
            ForecastModel::Overconfident => "Overconfident",
        }
    }

    /// Fit on training outcomes
    pub fn fit(&self, train: &[u8]) -> SimResult<Forecaster> {
        if train.is_empty() {
            return Err(SimError::DegenerateComputation(format!(
                "{} model needs a non-empty training set",
                self.name()
            )));
        }

        let mean = train.iter().map(|&y| f64::from(y)).sum::<f64>() / train.len() as f64;
        let probability = match self {
            ForecastModel::WellSpecified => mean,
            ForecastModel::MisSpecified => (mean + MIS_SPECIFIED_OFFSET).clamp(0.0, 1.0),
            ForecastModel::Overconfident => {
                if mean >= 0.5 {
                    OVERCONFIDENT_HIGH
                } else {
                    OVERCONFIDENT_LOW
                }
            }
        };

        Ok(Forecaster {
            model: *self,
            training_mean: mean,
            probability,
        })
    }
}

/// A fitted model issuing constant predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecaster {
    pub model: ForecastModel,
    pub training_mean: f64,
    pub probability: f64,
}

impl Forecaster {
    /// Predicted probabilities for the next `count` trials
    pub fn forecast(&self, count: usize) -> Vec<f64> {
        vec![self.probability; count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAIN: [u8; 10] = [1, 0, 0, 1, 0, 0, 1, 0, 0, 1]; // mean 0.4

    #[test]
    fn test_well_specified_predicts_mean() {
        let f = ForecastModel::WellSpecified.fit(&TRAIN).unwrap();
        assert!((f.probability - 0.4).abs() < 1e-12);
        assert_eq!(f.forecast(3).len(), 3);
    }

    #[test]
    fn test_mis_specified_offsets_and_clamps() {
        let f = ForecastModel::MisSpecified.fit(&TRAIN).unwrap();
        assert!((f.probability - 0.7).abs() < 1e-12);

        let f = ForecastModel::MisSpecified.fit(&[1, 1, 1, 0]).unwrap();
        assert_eq!(f.probability, 1.0);
    }

    #[test]
    fn test_overconfident_is_sharp() {
        let low = ForecastModel::Overconfident.fit(&TRAIN).unwrap();
        assert_eq!(low.probability, OVERCONFIDENT_LOW);

        let high = ForecastModel::Overconfident.fit(&[1, 0]).unwrap();
        assert_eq!(high.probability, OVERCONFIDENT_HIGH); // mean exactly 0.5
    }

    #[test]
    fn test_forecast_zero_count() {
        let f = ForecastModel::WellSpecified.fit(&TRAIN).unwrap();
        assert!(f.forecast(0).is_empty());
    }

    #[test]
    fn test_fit_empty_training_set() {
        for model in ForecastModel::ALL {
            assert!(matches!(
                model.fit(&[]),
                Err(SimError::DegenerateComputation(_))
            ));
        }
    }
}
