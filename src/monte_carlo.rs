//! Monte Carlo sampling of the buy-minus-rent NPV differential
//!
//! House and rent growth are drawn from independent normal distributions
//! centred on the base assumptions. Every draw is taken from a single seeded
//! generator before any evaluation, so a fixed seed reproduces the exact
//! result even though the NPVs are evaluated in parallel.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::assumptions::Assumptions;
use crate::error::{EngineError, EngineResult};
use crate::projection::NpvEngine;

const HISTOGRAM_BINS: usize = 20;

/// Lowest growth rate a draw may take; a rate at or below -100% has no price path
const GROWTH_FLOOR: f64 = -0.99;

/// Settings for a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of (house growth, rent growth) draws
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// Standard deviation of both growth rates (0.02 = 2 percentage points)
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,
    /// Fixed seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
}

fn default_samples() -> u32 {
    1_000
}

fn default_std_dev() -> f64 {
    0.02
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            std_dev: default_std_dev(),
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.samples == 0 {
            return Err(EngineError::invalid("samples", "must be at least 1"));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(EngineError::invalid("std_dev", "must be a non-negative number"));
        }
        Ok(())
    }
}

/// Percentile summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// A single histogram bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Descriptive statistics of the differential distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    pub histogram: Vec<HistogramBin>,
}

/// Outcome of a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Fraction of draws where buying's NPV beats renting's
    pub win_probability: f64,
    /// Buy-minus-rent NPV per draw, in draw order
    pub differentials: Vec<f64>,
    pub summary: DifferentialSummary,
}

/// Sample the buy-minus-rent differential under perturbed growth
pub fn run_monte_carlo(assumptions: &Assumptions, config: &MonteCarloConfig) -> EngineResult<MonteCarloResult> {
    config.validate()?;
    let engine = NpvEngine::new(assumptions.clone())?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_with_rng(&engine, config, &mut rng)
}

/// Run against a prepared engine with a caller-supplied generator
pub fn run_with_rng<R: Rng>(engine: &NpvEngine, config: &MonteCarloConfig, rng: &mut R) -> EngineResult<MonteCarloResult> {
    config.validate()?;
    let base = engine.assumptions();

    if config.std_dev == 0.0 {
        warn!("Monte Carlo std dev is zero; every draw equals the base scenario");
    }

    let house = GrowthSampler::new(base.house_growth, config.std_dev)?;
    let rent = GrowthSampler::new(base.rent_growth, config.std_dev)?;

    let draws: Vec<(f64, f64)> = (0..config.samples)
        .map(|_| {
            let hg = house.sample(rng);
            let rg = rent.sample(rng);
            (hg, rg)
        })
        .collect();
    debug!("Drew {} growth pairs (std dev {})", draws.len(), config.std_dev);

    let differentials = draws
        .par_iter()
        .map(|&(hg, rg)| engine.compute_npv(hg, rg).map(|npv| npv.difference()))
        .collect::<EngineResult<Vec<f64>>>()?;

    let wins = differentials.iter().filter(|&&d| d > 0.0).count();
    let win_probability = wins as f64 / differentials.len() as f64;
    let summary = summarise(&differentials);

    info!(
        "Monte Carlo: {} draws, buying wins {:.2}% (mean differential {:.2})",
        differentials.len(),
        win_probability * 100.0,
        summary.mean
    );

    Ok(MonteCarloResult {
        win_probability,
        differentials,
        summary,
    })
}

/// Normal draw around a base growth rate, floored at `GROWTH_FLOOR`; a zero
/// std dev always returns the base
enum GrowthSampler {
    Fixed(f64),
    Normal(Normal),
}

impl GrowthSampler {
    fn new(mean: f64, std_dev: f64) -> EngineResult<Self> {
        if std_dev == 0.0 {
            return Ok(GrowthSampler::Fixed(mean));
        }
        Normal::new(mean, std_dev)
            .map(GrowthSampler::Normal)
            .map_err(|e| EngineError::invalid("std_dev", format!("invalid normal parameters: {e}")))
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            GrowthSampler::Fixed(value) => *value,
            GrowthSampler::Normal(dist) => rng.sample::<f64, _>(dist).max(GROWTH_FLOOR),
        }
    }
}

/// Percentile of a sorted slice with linear interpolation
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Equal-width histogram over a sorted slice
fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];
    let n = sorted.len() as f64;

    // All values identical
    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| HistogramBin {
            lower: min_val + i as f64 * bin_width,
            upper: if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            },
            count: 0,
            frequency: 0.0,
        })
        .collect();

    for &val in sorted {
        let idx = (((val - min_val) / bin_width).floor() as usize).min(num_bins - 1);
        bins[idx].count += 1;
    }
    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }

    bins
}

fn summarise(values: &[f64]) -> DifferentialSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;

    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    DifferentialSummary {
        mean,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        percentiles: Percentiles {
            p5: percentile_sorted(&sorted, 5.0),
            p10: percentile_sorted(&sorted, 10.0),
            p25: percentile_sorted(&sorted, 25.0),
            p50: percentile_sorted(&sorted, 50.0),
            p75: percentile_sorted(&sorted, 75.0),
            p90: percentile_sorted(&sorted, 90.0),
            p95: percentile_sorted(&sorted, 95.0),
        },
        histogram: build_histogram(&sorted, HISTOGRAM_BINS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::compute_npv;
    use approx::assert_relative_eq;

    fn config(samples: u32, std_dev: f64, seed: u64) -> MonteCarloConfig {
        MonteCarloConfig {
            samples,
            std_dev,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_wide_std_dev_floors_draws() {
        let base = Assumptions::classroom_defaults();
        let result = run_monte_carlo(&base, &config(1_000, 0.5, 1)).unwrap();
        assert_eq!(result.differentials.len(), 1_000);
        assert!(result.differentials.iter().all(|d| d.is_finite()));
        assert!(result.win_probability > 0.0 && result.win_probability < 1.0);

        let sampler = GrowthSampler::new(-0.5, 5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            assert!(sampler.sample(&mut rng) >= GROWTH_FLOOR);
        }
    }

    #[test]
    fn test_zero_std_dev_collapses_to_base() {
        let base = Assumptions::classroom_defaults();
        let expected = compute_npv(&base, base.house_growth, base.rent_growth)
            .unwrap()
            .difference();

        let result = run_monte_carlo(&base, &config(50, 0.0, 1)).unwrap();
        assert_eq!(result.differentials.len(), 50);
        for d in &result.differentials {
            assert_eq!(*d, expected);
        }
        let expected_win = if expected > 0.0 { 1.0 } else { 0.0 };
        assert_eq!(result.win_probability, expected_win);
        assert_eq!(result.summary.histogram.len(), 1);
    }

    #[test]
    fn test_same_seed_same_result() {
        let base = Assumptions::monthly_defaults();
        let a = run_monte_carlo(&base, &config(200, 0.02, 42)).unwrap();
        let b = run_monte_carlo(&base, &config(200, 0.02, 42)).unwrap();
        assert_eq!(a, b);

        let c = run_monte_carlo(&base, &config(200, 0.02, 43)).unwrap();
        assert_ne!(a.differentials, c.differentials);
    }

    #[test]
    fn test_win_probability_matches_samples() {
        let base = Assumptions::classroom_defaults();
        let result = run_monte_carlo(&base, &config(500, 0.03, 7)).unwrap();
        let wins = result.differentials.iter().filter(|&&d| d > 0.0).count();
        assert_relative_eq!(result.win_probability, wins as f64 / 500.0);
        assert!((0.0..=1.0).contains(&result.win_probability));
    }

    #[test]
    fn test_summary_is_consistent() {
        let base = Assumptions::classroom_defaults();
        let result = run_monte_carlo(&base, &config(300, 0.02, 11)).unwrap();
        let s = &result.summary;
        assert!(s.min <= s.percentiles.p5);
        assert!(s.percentiles.p5 <= s.percentiles.p50);
        assert!(s.percentiles.p50 <= s.percentiles.p95);
        assert!(s.percentiles.p95 <= s.max);
        assert_eq!(s.histogram.len(), HISTOGRAM_BINS);
        let total: u32 = s.histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, 300);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let base = Assumptions::classroom_defaults();
        assert!(run_monte_carlo(&base, &config(0, 0.02, 1)).is_err());
        assert!(run_monte_carlo(&base, &config(10, -0.01, 1)).is_err());
        assert!(run_monte_carlo(&base, &config(10, f64::NAN, 1)).is_err());
    }

    #[test]
    fn test_caller_supplied_rng() {
        let engine = NpvEngine::new(Assumptions::classroom_defaults()).unwrap();
        let cfg = config(100, 0.02, 0);
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let a = run_with_rng(&engine, &cfg, &mut rng_a).unwrap();
        let b = run_with_rng(&engine, &cfg, &mut rng_b).unwrap();
        assert_eq!(a.differentials, b.differentials);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(percentile_sorted(&sorted, 50.0), 20.0);
        assert_relative_eq!(percentile_sorted(&sorted, 10.0), 4.0);
    }
}
