//! Descriptive statistics: location, spread, and the summary bundle.
//!
//! Variance uses Welford's single-pass update for numerical stability;
//! quantiles use the linear-interpolation estimator on a sorted copy.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::validation::{require_all_finite, require_min_len, require_unit_interval};

/// Welford accumulation: returns (n, mean, sum of squared deviations).
fn welford(sample: &[f64]) -> (usize, f64, f64) {
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in sample.iter().enumerate() {
        let delta = x - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (x - mean);
    }
    (sample.len(), mean, m2)
}

/// Arithmetic mean. Requires a non-empty, finite sample.
pub fn mean(sample: &[f64]) -> AnalysisResult<f64> {
    require_min_len("sample", sample.len(), 1)?;
    require_all_finite("sample", sample)?;
    Ok(welford(sample).1)
}

/// Unbiased sample variance (n − 1 denominator). Requires n ≥ 2.
pub fn sample_variance(sample: &[f64]) -> AnalysisResult<f64> {
    require_min_len("sample", sample.len(), 2)?;
    require_all_finite("sample", sample)?;
    let (n, _, m2) = welford(sample);
    Ok(m2 / (n - 1) as f64)
}

/// Sample standard deviation. Requires n ≥ 2.
pub fn sample_std_dev(sample: &[f64]) -> AnalysisResult<f64> {
    Ok(sample_variance(sample)?.sqrt())
}

/// Standard error of the mean, s/√n. Requires n ≥ 2.
pub fn standard_error(sample: &[f64]) -> AnalysisResult<f64> {
    let sd = sample_std_dev(sample)?;
    Ok(sd / (sample.len() as f64).sqrt())
}

/// Quantile at probability `p` via linear interpolation between order
/// statistics (the R-7 estimator).
pub fn quantile(sample: &[f64], p: f64) -> AnalysisResult<f64> {
    require_min_len("sample", sample.len(), 1)?;
    require_all_finite("sample", sample)?;
    require_unit_interval("p", p)?;

    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, p))
}

/// Quantile from an already-sorted slice (no checks).
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Sample median.
pub fn median(sample: &[f64]) -> AnalysisResult<f64> {
    quantile(sample, 0.5)
}

/// Interquartile range, Q3 − Q1.
pub fn interquartile_range(sample: &[f64]) -> AnalysisResult<f64> {
    require_min_len("sample", sample.len(), 2)?;
    require_all_finite("sample", sample)?;
    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25))
}

/// One-shot summary of a numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveSummary {
    /// Number of observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n − 1).
    pub std_dev: f64,
    /// Sample variance (n − 1).
    pub variance: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Interquartile range, Q3 − Q1.
    pub iqr: f64,
}

/// Compute the full descriptive bundle. Requires n ≥ 2.
pub fn describe(sample: &[f64]) -> AnalysisResult<DescriptiveSummary> {
    if sample.len() < 2 {
        return Err(AnalysisError::insufficient(
            2,
            sample.len(),
            "descriptive summary",
        ));
    }
    require_all_finite("sample", sample)?;

    let (n, mean, m2) = welford(sample);
    let variance = m2 / (n - 1) as f64;

    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);

    Ok(DescriptiveSummary {
        n,
        mean,
        std_dev: variance.sqrt(),
        variance,
        min: sorted[0],
        max: sorted[n - 1],
        median: quantile_sorted(&sorted, 0.5),
        q1,
        q3,
        iqr: q3 - q1,
    })
}
