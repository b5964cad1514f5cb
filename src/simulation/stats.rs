//! Sample Statistics
//!
//! Normal samples, descriptive statistics and an equal-width histogram,
//! written out as a JSON statistics file.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::StatsConfig;
use crate::error::{validate_length, SimError, SimResult};

/// Draw `n` samples from N(mean, std_dev²)
pub fn normal_samples<R: Rng + ?Sized>(
    n: usize,
    mean: f64,
    std_dev: f64,
    rng: &mut R,
) -> SimResult<Vec<f64>> {
    validate_length("Sample size", n)?;
    let dist = Normal::new(mean, std_dev)
        .map_err(|e| SimError::InvalidParameter(format!("Normal distribution: {}", e)))?;
    Ok(dist.sample_iter(rng).take(n).collect())
}

/// Descriptive statistics (population variance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleStats {
    pub fn from_samples(samples: &[f64]) -> SimResult<Self> {
        if samples.is_empty() {
            return Err(SimError::DegenerateComputation(
                "Cannot describe an empty sample".to_string(),
            ));
        }

        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Ok(Self {
            count,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

/// Equal-width histogram between the sample min and max
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_samples(samples: &[f64], bins: usize) -> SimResult<Self> {
        validate_length("Histogram bins", bins)?;
        if samples.is_empty() {
            return Err(SimError::DegenerateComputation(
                "Cannot bin an empty sample".to_string(),
            ));
        }

        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        // All-equal samples still get a non-zero width
        let (lo, hi) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let width = (hi - lo) / bins as f64;

        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &x in samples {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Self { edges, counts })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Statistics file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub generated_at: DateTime<Utc>,
    pub config: StatsConfig,
    #[serde(flatten)]
    pub stats: SampleStats,
    pub histogram: Histogram,
}

impl StatsReport {
    /// Write as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "Wrote statistics file");
        Ok(())
    }
}

/// Generate samples and summarize them
pub fn run_stats(config: &StatsConfig) -> SimResult<StatsReport> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let samples = normal_samples(config.n, config.mean, config.std_dev, &mut rng)?;

    let stats = SampleStats::from_samples(&samples)?;
    let histogram = Histogram::from_samples(&samples, config.bins)?;
    info!(n = stats.count, mean = stats.mean, std_dev = stats.std_dev, "Sampled normal data");

    Ok(StatsReport {
        generated_at: Utc::now(),
        config: config.clone(),
        stats,
        histogram,
    })
}
