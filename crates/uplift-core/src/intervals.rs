//! Confidence intervals for means, proportions, and proportion differences.

use serde::{Deserialize, Serialize};

use crate::descriptive;
use crate::dist;
use crate::error::{AnalysisError, AnalysisResult};
use crate::validation::{require_count_le_total, require_probability};

/// t-based confidence interval for a mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanInterval {
    /// Sample mean.
    pub mean: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// Margin of error (half-width).
    pub margin: f64,
    /// Degrees of freedom, n − 1.
    pub degrees_of_freedom: usize,
    /// Requested confidence level.
    pub confidence: f64,
}

/// Confidence interval for a mean from a raw sample, using the Student-t
/// critical value. Requires n ≥ 2.
pub fn confidence_interval_mean(sample: &[f64], confidence: f64) -> AnalysisResult<MeanInterval> {
    require_probability("confidence", confidence)?;
    if sample.len() < 2 {
        return Err(AnalysisError::insufficient(
            2,
            sample.len(),
            "mean confidence interval",
        ));
    }

    let mean = descriptive::mean(sample)?;
    let std_error = descriptive::standard_error(sample)?;
    let df = sample.len() - 1;
    let t_crit = dist::t_quantile(1.0 - (1.0 - confidence) / 2.0, df as f64);
    let margin = t_crit * std_error;

    Ok(MeanInterval {
        mean,
        lower: mean - margin,
        upper: mean + margin,
        std_error,
        margin,
        degrees_of_freedom: df,
        confidence,
    })
}

/// Interval construction method for a single proportion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProportionMethod {
    /// Wald interval on the normal approximation.
    #[default]
    Normal,
    /// Wilson score interval.
    Wilson,
    /// Agresti–Coull adjusted-count interval.
    AgrestiCoull,
    /// Exact Clopper–Pearson interval from beta quantiles.
    Exact,
}

/// Method-specific internals carried alongside the shared interval shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MethodDetails {
    /// Wald standard error.
    Normal {
        /// √(p̂(1−p̂)/n).
        std_error: f64,
    },
    /// Wilson score internals.
    Wilson {
        /// Recentered point estimate.
        center: f64,
        /// Interval half-width around the center.
        half_width: f64,
    },
    /// Agresti–Coull adjusted counts.
    AgrestiCoull {
        /// Adjusted proportion p̃.
        adjusted_proportion: f64,
        /// Adjusted sample size ñ = n + z².
        adjusted_n: f64,
    },
    /// Clopper–Pearson beta parameters.
    Exact {
        /// (a, b) of the lower-bound Beta quantile, if used.
        lower_beta: Option<(f64, f64)>,
        /// (a, b) of the upper-bound Beta quantile, if used.
        upper_beta: Option<(f64, f64)>,
    },
}

/// Confidence interval for a single proportion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionInterval {
    /// Observed proportion count/nobs.
    pub proportion: f64,
    /// Lower bound, clamped to [0, 1].
    pub lower: f64,
    /// Upper bound, clamped to [0, 1].
    pub upper: f64,
    /// Requested confidence level.
    pub confidence: f64,
    /// Construction method.
    pub method: ProportionMethod,
    /// Method-specific internals.
    pub details: MethodDetails,
}

/// Confidence interval for a binomial proportion by the selected method.
///
/// All four methods return the same result shape; whatever intermediate
/// values the method produces land in [`MethodDetails`].
pub fn confidence_interval_proportion(
    count: u64,
    nobs: u64,
    confidence: f64,
    method: ProportionMethod,
) -> AnalysisResult<ProportionInterval> {
    require_probability("confidence", confidence)?;
    require_count_le_total(count, nobs)?;

    let alpha = 1.0 - confidence;
    let z = dist::normal_quantile(1.0 - alpha / 2.0);
    let n = nobs as f64;
    let x = count as f64;
    let p_hat = x / n;

    let (lower, upper, details) = match method {
        ProportionMethod::Normal => {
            let std_error = (p_hat * (1.0 - p_hat) / n).sqrt();
            (
                p_hat - z * std_error,
                p_hat + z * std_error,
                MethodDetails::Normal { std_error },
            )
        }
        ProportionMethod::Wilson => {
            let z2 = z * z;
            let denom = 1.0 + z2 / n;
            let center = (p_hat + z2 / (2.0 * n)) / denom;
            let half_width =
                z * (p_hat * (1.0 - p_hat) / n + z2 / (4.0 * n * n)).sqrt() / denom;
            (
                center - half_width,
                center + half_width,
                MethodDetails::Wilson { center, half_width },
            )
        }
        ProportionMethod::AgrestiCoull => {
            let z2 = z * z;
            let adjusted_n = n + z2;
            let adjusted_p = (x + z2 / 2.0) / adjusted_n;
            let half = z * (adjusted_p * (1.0 - adjusted_p) / adjusted_n).sqrt();
            (
                adjusted_p - half,
                adjusted_p + half,
                MethodDetails::AgrestiCoull {
                    adjusted_proportion: adjusted_p,
                    adjusted_n,
                },
            )
        }
        ProportionMethod::Exact => {
            // Clopper-Pearson via beta quantiles; closed forms at the ends
            let (lower, lower_beta) = if count == 0 {
                (0.0, None)
            } else {
                let (a, b) = (x, n - x + 1.0);
                (dist::beta_quantile(alpha / 2.0, a, b), Some((a, b)))
            };
            let (upper, upper_beta) = if count == nobs {
                (1.0, None)
            } else {
                let (a, b) = (x + 1.0, n - x);
                (dist::beta_quantile(1.0 - alpha / 2.0, a, b), Some((a, b)))
            };
            (
                lower,
                upper,
                MethodDetails::Exact {
                    lower_beta,
                    upper_beta,
                },
            )
        }
    };

    Ok(ProportionInterval {
        proportion: p_hat,
        lower: lower.clamp(0.0, 1.0),
        upper: upper.clamp(0.0, 1.0),
        confidence,
        method,
        details,
    })
}

/// Interval construction method for a difference of proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiffMethod {
    /// Wald interval on the normal approximation.
    #[default]
    Normal,
    /// Agresti–Caffo: add one success and one failure per group, then the
    /// normal computation on the adjusted counts.
    AgrestiCaffo,
}

/// Confidence interval for a difference of two proportions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionDiffInterval {
    /// Raw observed difference p̂₁ − p̂₂.
    pub difference: f64,
    /// Lower bound, clamped to [−1, 1].
    pub lower: f64,
    /// Upper bound, clamped to [−1, 1].
    pub upper: f64,
    /// Standard error used for the bounds (of the adjusted difference for
    /// Agresti–Caffo).
    pub std_error: f64,
    /// Requested confidence level.
    pub confidence: f64,
    /// Construction method.
    pub method: DiffMethod,
}

/// Confidence interval for the difference of two independent proportions.
pub fn confidence_interval_proportion_diff(
    count1: u64,
    nobs1: u64,
    count2: u64,
    nobs2: u64,
    confidence: f64,
    method: DiffMethod,
) -> AnalysisResult<ProportionDiffInterval> {
    require_probability("confidence", confidence)?;
    require_count_le_total(count1, nobs1)?;
    require_count_le_total(count2, nobs2)?;

    let z = dist::normal_quantile(1.0 - (1.0 - confidence) / 2.0);
    let difference = count1 as f64 / nobs1 as f64 - count2 as f64 / nobs2 as f64;

    // Center and per-group counts the interval is computed from
    let (x1, n1, x2, n2) = match method {
        DiffMethod::Normal => (count1 as f64, nobs1 as f64, count2 as f64, nobs2 as f64),
        DiffMethod::AgrestiCaffo => (
            count1 as f64 + 1.0,
            nobs1 as f64 + 2.0,
            count2 as f64 + 1.0,
            nobs2 as f64 + 2.0,
        ),
    };
    let p1 = x1 / n1;
    let p2 = x2 / n2;
    let center = p1 - p2;
    let std_error = (p1 * (1.0 - p1) / n1 + p2 * (1.0 - p2) / n2).sqrt();

    Ok(ProportionDiffInterval {
        difference,
        lower: (center - z * std_error).clamp(-1.0, 1.0),
        upper: (center + z * std_error).clamp(-1.0, 1.0),
        std_error,
        confidence,
        method,
    })
}
