//! Proper Scoring Rules
//!
//! Brier score, log loss and binned calibration curves for binary forecasts.

use crate::error::{validate_aligned, validate_outcomes, validate_predictions, SimError, SimResult};
use crate::models::{CalibrationCurve, ScoreRecord};

/// Clamp used by [`log_loss`] when no explicit epsilon is given
pub const DEFAULT_LOG_LOSS_EPS: f64 = 1e-12;

/// Default number of calibration bins
pub const DEFAULT_CALIBRATION_BINS: usize = 10;

/// Aligned, non-empty, 0/1 outcomes and probabilities in [0, 1]
fn validate_scoring_inputs(y_true: &[u8], p_pred: &[f64]) -> SimResult<()> {
    validate_aligned(y_true.len(), p_pred.len())?;
    validate_outcomes(y_true)?;
    validate_predictions(p_pred)
}

/// Mean squared error between predicted probabilities and 0/1 outcomes
///
/// # Examples
/// ```
/// use quantsim::core::scoring::brier_score;
/// let score = brier_score(&[1, 0], &[0.5, 0.5]).unwrap();
/// assert!((score - 0.25).abs() < 1e-12);
/// ```
pub fn brier_score(y_true: &[u8], p_pred: &[f64]) -> SimResult<f64> {
    validate_scoring_inputs(y_true, p_pred)?;

    let total: f64 = y_true
        .iter()
        .zip(p_pred)
        .map(|(&y, &p)| (p - f64::from(y)).powi(2))
        .sum();

    Ok(total / y_true.len() as f64)
}

/// Mean negative log-likelihood, predictions clamped to `[eps, 1 - eps]`
pub fn log_loss(y_true: &[u8], p_pred: &[f64], eps: f64) -> SimResult<f64> {
    validate_scoring_inputs(y_true, p_pred)?;
    if !(eps > 0.0 && eps < 0.5) {
        return Err(SimError::InvalidParameter(format!(
            "Log loss epsilon must be in (0, 0.5), got {}",
            eps
        )));
    }

    let total: f64 = y_true
        .iter()
        .zip(p_pred)
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            let y = f64::from(y);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();

    Ok(total / y_true.len() as f64)
}

/// Bin index for a prediction; 1.0 falls into the last bin
fn bin_index(p: f64, bins: usize) -> usize {
    ((p * bins as f64) as usize).min(bins - 1)
}

/// Per-bin (sum of predictions, sum of outcomes, count)
fn bin_totals(y_true: &[u8], p_pred: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let mut acc = vec![(0.0_f64, 0.0_f64, 0usize); bins];
    for (&y, &p) in y_true.iter().zip(p_pred) {
        let slot = &mut acc[bin_index(p, bins)];
        slot.0 += p;
        slot.1 += f64::from(y);
        slot.2 += 1;
    }
    acc
}

/// Calibration curve over `bins` equal-width probability bins
///
/// Returns mean predicted and mean observed values for every non-empty bin,
/// ordered by bin. Empty bins are omitted.
pub fn calibration_curve(y_true: &[u8], p_pred: &[f64], bins: usize) -> SimResult<CalibrationCurve> {
    if bins == 0 {
        return Err(SimError::InvalidParameter(
            "Calibration curve needs at least one bin".to_string(),
        ));
    }
    validate_scoring_inputs(y_true, p_pred)?;

    let acc = bin_totals(y_true, p_pred, bins);

    let mut curve = CalibrationCurve::default();
    for (sum_p, sum_y, count) in acc.into_iter().filter(|(_, _, c)| *c > 0) {
        curve.mean_predicted.push(sum_p / count as f64);
        curve.mean_observed.push(sum_y / count as f64);
    }

    Ok(curve)
}

/// Expected calibration error: count-weighted mean |predicted - observed| over bins
pub fn expected_calibration_error(y_true: &[u8], p_pred: &[f64], bins: usize) -> SimResult<f64> {
    if bins == 0 {
        return Err(SimError::InvalidParameter(
            "Calibration error needs at least one bin".to_string(),
        ));
    }
    validate_scoring_inputs(y_true, p_pred)?;

    let acc = bin_totals(y_true, p_pred, bins);

    let n = y_true.len() as f64;
    Ok(acc
        .iter()
        .filter(|(_, _, c)| *c > 0)
        .map(|(sum_p, sum_y, c)| (*c as f64 / n) * ((sum_p - sum_y) / *c as f64).abs())
        .sum())
}

impl ScoreRecord {
    /// Score a set of forecasts against realized outcomes
    pub fn evaluate(y_true: &[u8], p_pred: &[f64], bins: usize) -> SimResult<Self> {
        Ok(Self {
            brier: brier_score(y_true, p_pred)?,
            log_loss: log_loss(y_true, p_pred, DEFAULT_LOG_LOSS_EPS)?,
            calibration: calibration_curve(y_true, p_pred, bins)?,
            ece: expected_calibration_error(y_true, p_pred, bins)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brier_perfect_forecast() {
        let y = [1, 0, 0, 1, 1];
        let p: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        assert_eq!(brier_score(&y, &p).unwrap(), 0.0);
    }

    #[test]
    fn test_brier_worst_forecast() {
        let score = brier_score(&[1, 0], &[0.0, 1.0]).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_brier_rejects_mismatch_and_empty() {
        assert!(matches!(
            brier_score(&[1, 0], &[0.5]),
            Err(SimError::DegenerateComputation(_))
        ));
        assert!(matches!(
            brier_score(&[], &[]),
            Err(SimError::DegenerateComputation(_))
        ));
    }

    #[test]
    fn test_log_loss_coin_flip() {
        let loss = log_loss(&[1, 0, 1, 0], &[0.5; 4], DEFAULT_LOG_LOSS_EPS).unwrap();
        assert!((loss - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_clamps_certain_mistakes() {
        // Without clamping this would be infinite
        let loss = log_loss(&[1], &[0.0], DEFAULT_LOG_LOSS_EPS).unwrap();
        assert!(loss.is_finite());
        assert!((loss - (-(1e-12_f64).ln())).abs() < 1e-6);
    }

    #[test]
    fn test_log_loss_symmetric_under_flip() {
        let y = [1, 0, 0, 1, 1, 0];
        let p = [0.9, 0.2, 0.35, 0.6, 0.51, 0.05];
        let y_flip: Vec<u8> = y.iter().map(|&v| 1 - v).collect();
        let p_flip: Vec<f64> = p.iter().map(|&v| 1.0 - v).collect();

        let a = log_loss(&y, &p, DEFAULT_LOG_LOSS_EPS).unwrap();
        let b = log_loss(&y_flip, &p_flip, DEFAULT_LOG_LOSS_EPS).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_rejects_bad_eps() {
        assert!(log_loss(&[1], &[0.5], 0.0).is_err());
        assert!(log_loss(&[1], &[0.5], 0.6).is_err());
    }

    #[test]
    fn test_calibration_curve_omits_empty_bins() {
        let y = [1, 0, 1, 1];
        let p = [0.15, 0.15, 0.85, 0.85];
        let curve = calibration_curve(&y, &p, 10).unwrap();

        assert_eq!(curve.len(), 2);
        assert!((curve.mean_predicted[0] - 0.15).abs() < 1e-12);
        assert!((curve.mean_observed[0] - 0.5).abs() < 1e-12);
        assert!((curve.mean_predicted[1] - 0.85).abs() < 1e-12);
        assert!((curve.mean_observed[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_calibration_curve_constant_forecast_single_point() {
        let y = [1, 0, 0, 1, 0];
        let curve = calibration_curve(&y, &[0.4; 5], 10).unwrap();
        assert_eq!(curve.len(), 1);
        assert!((curve.mean_observed[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_calibration_curve_edges() {
        // 0.0 lands in the first bin, 1.0 in the last
        let curve = calibration_curve(&[0, 1], &[0.0, 1.0], 4).unwrap();
        assert_eq!(curve.mean_predicted, vec![0.0, 1.0]);
        assert_eq!(curve.mean_observed, vec![0.0, 1.0]);
    }

    #[test]
    fn test_calibration_curve_zero_bins() {
        assert!(matches!(
            calibration_curve(&[1], &[0.5], 0),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_expected_calibration_error() {
        let ece = expected_calibration_error(&[1, 0, 1, 1], &[0.15, 0.15, 0.85, 0.85], 10).unwrap();
        // bin 1: |0.15 - 0.5| * 0.5, bin 8: |0.85 - 1.0| * 0.5
        assert!((ece - (0.35 * 0.5 + 0.15 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_score_record_evaluate() {
        let record = ScoreRecord::evaluate(&[1, 0], &[0.5, 0.5], 10).unwrap();
        assert!((record.brier - 0.25).abs() < 1e-12);
        assert!((record.log_loss - std::f64::consts::LN_2).abs() < 1e-12);
        assert_eq!(record.calibration.len(), 1);
        assert!(record.ece.abs() < 1e-12);
    }

    #[test]
    fn test_scores_reject_invalid_predictions() {
        for bad in [f64::NAN, 1.5, -0.4] {
            let p = [0.5, bad];
            assert!(matches!(brier_score(&[1, 0], &p), Err(SimError::InvalidParameter(_))));
            assert!(matches!(
                log_loss(&[1, 0], &p, DEFAULT_LOG_LOSS_EPS),
                Err(SimError::InvalidParameter(_))
            ));
            assert!(matches!(
                calibration_curve(&[1, 0], &p, 10),
                Err(SimError::InvalidParameter(_))
            ));
            assert!(matches!(
                expected_calibration_error(&[1, 0], &p, 10),
                Err(SimError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_scores_reject_non_binary_outcomes() {
        let y = [1, 2];
        let p = [0.5, 0.5];
        assert!(matches!(brier_score(&y, &p), Err(SimError::InvalidParameter(_))));
        assert!(matches!(
            log_loss(&y, &p, DEFAULT_LOG_LOSS_EPS),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            calibration_curve(&y, &p, 10),
            Err(SimError::InvalidParameter(_))
        ));
    }
}
