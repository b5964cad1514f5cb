//! Outcome Generation
//!
//! Deterministic Bernoulli sequences with an optional single regime switch.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{
    validate_length, validate_probability, validate_switch_point, SimError, SimResult,
};
use crate::models::OutcomeSequence;

/// Seed used when none is given
pub const DEFAULT_SEED: u64 = 42;

/// Second probability regime, active from `switch_point` on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeSwitch {
    pub p2: f64,
    pub switch_point: usize,
}

/// Binary outcome generator
#[derive(Debug, Clone)]
pub struct OutcomeGenerator {
    n: usize,
    p1: f64,
    switch: Option<RegimeSwitch>,
    seed: u64,
}

impl OutcomeGenerator {
    /// Stationary generator of `n` draws with success probability `p1`
    pub fn new(n: usize, p1: f64) -> Self {
        Self {
            n,
            p1,
            switch: None,
            seed: DEFAULT_SEED,
        }
    }

    /// Use `p2` from index `switch_point` on
    #[must_use]
    pub fn with_switch(mut self, p2: f64, switch_point: usize) -> Self {
        self.switch = Some(RegimeSwitch { p2, switch_point });
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check every parameter; nothing is drawn if this fails
    pub fn validate(&self) -> SimResult<()> {
        validate_length("Sequence length", self.n)?;
        validate_probability("p1", self.p1)?;
        if let Some(switch) = self.switch {
            validate_probability("p2", switch.p2)?;
            validate_switch_point(switch.switch_point, self.n)?;
        }
        Ok(())
    }

    /// Probability in force at index `i`
    pub fn probability_at(&self, i: usize) -> f64 {
        match self.switch {
            Some(switch) if i >= switch.switch_point => switch.p2,
            _ => self.p1,
        }
    }

    /// Generate with a fresh RNG seeded from this generator's seed
    ///
    /// # Examples
    /// ```
    /// use quantsim::simulation::OutcomeGenerator;
    /// let generator = OutcomeGenerator::new(100, 0.55).with_seed(7);
    /// assert_eq!(generator.generate().unwrap(), generator.generate().unwrap());
    /// ```
    pub fn generate(&self) -> SimResult<OutcomeSequence> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.generate_with(&mut rng)
    }

    /// Generate drawing from a caller-owned RNG
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<OutcomeSequence> {
        self.validate()?;

        let outcomes = (0..self.n)
            .map(|i| {
                let u: f64 = rng.gen();
                u8::from(u < self.probability_at(i))
            })
            .collect();

        Ok(OutcomeSequence::new(outcomes))
    }
}

/// Generate `n` outcomes under `p1`, switching to `p2` at `switch_point`
///
/// `p2` and `switch_point` must be given together.
pub fn generate(
    n: usize,
    p1: f64,
    p2: Option<f64>,
    switch_point: Option<usize>,
    seed: u64,
) -> SimResult<OutcomeSequence> {
    let generator = match (p2, switch_point) {
        (Some(p2), Some(s)) => OutcomeGenerator::new(n, p1).with_switch(p2, s),
        (None, None) => OutcomeGenerator::new(n, p1),
        _ => {
            return Err(SimError::InvalidParameter(
                "p2 and switch_point must be given together".to_string(),
            ))
        }
    };
    generator.with_seed(seed).generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = generate(500, 0.4, None, None, 123).unwrap();
        let b = generate(500, 0.4, None, None, 123).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(500, 0.5, None, None, 1).unwrap();
        let b = generate(500, 0.5, None, None, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_outcomes_are_binary() {
        let seq = generate(1000, 0.3, Some(0.7), Some(400), 9).unwrap();
        assert!(seq.as_slice().iter().all(|&y| y == 0 || y == 1));
    }

    #[test]
    fn test_degenerate_probabilities() {
        let zeros = generate(50, 0.0, None, None, 5).unwrap();
        assert_eq!(zeros.successes(), 0);

        let ones = generate(50, 1.0, None, None, 5).unwrap();
        assert_eq!(ones.successes(), 50);
    }

    #[test]
    fn test_regime_switch() {
        let seq = generate(20, 0.0, Some(1.0), Some(8), 11).unwrap();
        let (before, after) = seq.split_at(8);
        assert!(before.iter().all(|&y| y == 0));
        assert!(after.iter().all(|&y| y == 1));
    }

    #[test]
    fn test_frequency_tracks_probability() {
        let seq = generate(10_000, 0.55, None, None, 42).unwrap();
        assert!((seq.frequency() - 0.55).abs() < 0.03);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(generate(0, 0.5, None, None, 1).is_err());
        assert!(generate(10, 1.5, None, None, 1).is_err());
        assert!(generate(10, 0.5, Some(-0.2), Some(5), 1).is_err());
        assert!(generate(10, 0.5, Some(0.6), Some(0), 1).is_err());
        assert!(generate(10, 0.5, Some(0.6), Some(10), 1).is_err());
        assert!(generate(10, 0.5, Some(0.6), None, 1).is_err());
    }

    #[test]
    fn test_validation_happens_before_drawing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut untouched = rng.clone();

        let result = OutcomeGenerator::new(10, 2.0).generate_with(&mut rng);
        assert!(result.is_err());

        // RNG state unchanged by the failed call
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_shared_rng_continues_stream() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let first = OutcomeGenerator::new(100, 0.5).generate_with(&mut rng).unwrap();
        let second = OutcomeGenerator::new(100, 0.5).generate_with(&mut rng).unwrap();
        assert_ne!(first, second);
    }
}
