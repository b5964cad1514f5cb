use thiserror::Error;

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimError {
    /// Out-of-range probability, non-positive length, bad switch point, ...
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty score inputs, zero Bayesian denominators and similar
    #[error("Degenerate computation: {0}")]
    DegenerateComputation(String),

    #[error("Unknown action: {0:?} (expected \"A\" or \"B\")")]
    UnknownAction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Validation functions
pub fn validate_probability(name: &str, prob: f64) -> SimResult<()> {
    if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
        return Err(SimError::InvalidParameter(format!(
            "{} must be between 0 and 1, got {}",
            name, prob
        )));
    }
    Ok(())
}

/// Strictly inside (0, 1), as required for priors and signal accuracies
pub fn validate_open_probability(name: &str, prob: f64) -> SimResult<()> {
    if !prob.is_finite() || prob <= 0.0 || prob >= 1.0 {
        return Err(SimError::InvalidParameter(format!(
            "{} must be strictly between 0 and 1, got {}",
            name, prob
        )));
    }
    Ok(())
}

pub fn validate_length(name: &str, n: usize) -> SimResult<()> {
    if n == 0 {
        return Err(SimError::InvalidParameter(format!(
            "{} must be positive, got 0",
            name
        )));
    }
    Ok(())
}

pub fn validate_switch_point(switch_point: usize, n: usize) -> SimResult<()> {
    if switch_point == 0 || switch_point >= n {
        return Err(SimError::InvalidParameter(format!(
            "Switch point must be between 1 and {}, got {}",
            n.saturating_sub(1),
            switch_point
        )));
    }
    Ok(())
}

pub fn validate_fraction(fraction: f64) -> SimResult<()> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(SimError::InvalidParameter(format!(
            "Betting fraction must be between 0 and 1, got {}",
            fraction
        )));
    }
    Ok(())
}

/// Score inputs must be non-empty and aligned
pub fn validate_aligned(y_len: usize, p_len: usize) -> SimResult<()> {
    if y_len != p_len {
        return Err(SimError::DegenerateComputation(format!(
            "Outcome and prediction lengths differ: {} vs {}",
            y_len, p_len
        )));
    }
    if y_len == 0 {
        return Err(SimError::DegenerateComputation(
            "Cannot score an empty sequence".to_string(),
        ));
    }
    Ok(())
}

/// Every prediction must be a finite probability
pub fn validate_predictions(p_pred: &[f64]) -> SimResult<()> {
    if let Some((i, &p)) = p_pred
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(*p))
    {
        return Err(SimError::InvalidParameter(format!(
            "Prediction {} must be between 0 and 1, got {}",
            i, p
        )));
    }
    Ok(())
}

/// Every outcome must be 0 or 1
pub fn validate_outcomes(outcomes: &[u8]) -> SimResult<()> {
    if let Some((i, &y)) = outcomes.iter().enumerate().find(|(_, y)| **y > 1) {
        return Err(SimError::InvalidParameter(format!(
            "Outcome {} must be 0 or 1, got {}",
            i, y
        )));
    }
    Ok(())
}
