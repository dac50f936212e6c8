//! Power analysis for proportion, mean, and correlation tests.
//!
//! Three symmetric families, each answering the same four questions:
//! how many observations for a target power, what effect a fixed sample
//! can detect, what power an (effect, sample) pair achieves, and the
//! resulting Type I/II error rates. All formulas are two-sided and sum
//! both tail probabilities, so power is exact rather than the common
//! one-tail shortcut.
//!
//! The mean family works on a standardized (Cohen's d) effect with two
//! equal groups; the correlation family works through the Fisher
//! z-transform with its √(n−3) standard error.

use serde::{Deserialize, Serialize};

use crate::dist;
use crate::error::{AnalysisError, AnalysisResult};
use crate::validation::{require_positive, require_probability};

/// The test family a power computation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerFamily {
    /// Proportion test on a standardized effect.
    Proportion,
    /// Two-sample mean test on Cohen's d (sample size is per group).
    Mean,
    /// Correlation test through the Fisher z-transform.
    Correlation,
}

/// Required sample size for a target power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeResult {
    /// Observations required, rounded up (per group for the mean family).
    pub sample_size: usize,
    /// The unrounded requirement.
    pub exact: f64,
    /// Effect size the computation assumed.
    pub effect_size: f64,
    /// Significance level.
    pub alpha: f64,
    /// Target power.
    pub power: f64,
    /// Which family produced this.
    pub family: PowerFamily,
}

/// Achieved power of a fixed design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerResult {
    /// Probability of rejecting a false null.
    pub power: f64,
    /// Effect size assumed.
    pub effect_size: f64,
    /// Sample size assumed.
    pub sample_size: usize,
    /// Significance level.
    pub alpha: f64,
    /// Which family produced this.
    pub family: PowerFamily,
}

/// Smallest effect a fixed design can detect at the target power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectableEffect {
    /// Minimum detectable effect size.
    pub effect_size: f64,
    /// Sample size assumed.
    pub sample_size: usize,
    /// Significance level.
    pub alpha: f64,
    /// Target power.
    pub power: f64,
    /// Which family produced this.
    pub family: PowerFamily,
}

/// Type I/II error rates of a fixed design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRates {
    /// Type I rate (the significance level).
    pub type_i: f64,
    /// Type II rate, 1 − power.
    pub type_ii: f64,
    /// Achieved power.
    pub power: f64,
    /// Which family produced this.
    pub family: PowerFamily,
}

/// Two-sided power for a z-statistic with noncentrality `drift`:
/// Φ(drift − z_crit) + Φ(−drift − z_crit), both rejection tails.
fn two_sided_power(drift: f64, alpha: f64) -> f64 {
    let z_crit = dist::normal_quantile(1.0 - alpha / 2.0);
    let upper = dist::normal_cdf(drift - z_crit);
    let lower = dist::normal_cdf(-drift - z_crit);
    (upper + lower).min(1.0)
}

fn z_pair(alpha: f64, power: f64) -> (f64, f64) {
    (
        dist::normal_quantile(1.0 - alpha / 2.0),
        dist::normal_quantile(power),
    )
}

// ============================================================================
// Proportion family
// ============================================================================

/// Sample size for a proportion test at a standardized effect size.
pub fn sample_size_for_proportion_test(
    effect_size: f64,
    alpha: f64,
    power: f64,
) -> AnalysisResult<SampleSizeResult> {
    require_positive("effect_size", effect_size)?;
    require_probability("alpha", alpha)?;
    require_probability("power", power)?;

    let (z_alpha, z_power) = z_pair(alpha, power);
    let exact = ((z_alpha + z_power) / effect_size).powi(2);

    Ok(SampleSizeResult {
        sample_size: exact.ceil() as usize,
        exact,
        effect_size,
        alpha,
        power,
        family: PowerFamily::Proportion,
    })
}

/// Minimum detectable standardized effect for a fixed proportion sample.
pub fn minimum_detectable_effect_proportion(
    sample_size: usize,
    alpha: f64,
    power: f64,
) -> AnalysisResult<DetectableEffect> {
    require_probability("alpha", alpha)?;
    require_probability("power", power)?;
    if sample_size < 2 {
        return Err(AnalysisError::insufficient(2, sample_size, "sample size"));
    }

    let (z_alpha, z_power) = z_pair(alpha, power);
    Ok(DetectableEffect {
        effect_size: (z_alpha + z_power) / (sample_size as f64).sqrt(),
        sample_size,
        alpha,
        power,
        family: PowerFamily::Proportion,
    })
}

/// Achieved power of a proportion test.
pub fn power_of_proportion_test(
    effect_size: f64,
    sample_size: usize,
    alpha: f64,
) -> AnalysisResult<PowerResult> {
    require_positive("effect_size", effect_size)?;
    require_probability("alpha", alpha)?;
    if sample_size < 2 {
        return Err(AnalysisError::insufficient(2, sample_size, "sample size"));
    }

    let drift = effect_size * (sample_size as f64).sqrt();
    Ok(PowerResult {
        power: two_sided_power(drift, alpha),
        effect_size,
        sample_size,
        alpha,
        family: PowerFamily::Proportion,
    })
}

/// Type I/II error rates of a proportion design.
pub fn error_rates_proportion(
    effect_size: f64,
    sample_size: usize,
    alpha: f64,
) -> AnalysisResult<ErrorRates> {
    let power = power_of_proportion_test(effect_size, sample_size, alpha)?.power;
    Ok(ErrorRates {
        type_i: alpha,
        type_ii: 1.0 - power,
        power,
        family: PowerFamily::Proportion,
    })
}

// ============================================================================
// Mean family (two-sample, Cohen's d)
// ============================================================================

/// Per-group sample size for a two-sample mean test at Cohen's d.
pub fn sample_size_for_mean_test(
    effect_size: f64,
    alpha: f64,
    power: f64,
) -> AnalysisResult<SampleSizeResult> {
    require_positive("effect_size", effect_size)?;
    require_probability("alpha", alpha)?;
    require_probability("power", power)?;

    let (z_alpha, z_power) = z_pair(alpha, power);
    let exact = 2.0 * ((z_alpha + z_power) / effect_size).powi(2);

    Ok(SampleSizeResult {
        sample_size: exact.ceil() as usize,
        exact,
        effect_size,
        alpha,
        power,
        family: PowerFamily::Mean,
    })
}

/// Minimum detectable Cohen's d for a fixed per-group sample.
pub fn minimum_detectable_effect_mean(
    sample_size: usize,
    alpha: f64,
    power: f64,
) -> AnalysisResult<DetectableEffect> {
    require_probability("alpha", alpha)?;
    require_probability("power", power)?;
    if sample_size < 2 {
        return Err(AnalysisError::insufficient(2, sample_size, "sample size"));
    }

    let (z_alpha, z_power) = z_pair(alpha, power);
    Ok(DetectableEffect {
        effect_size: (z_alpha + z_power) * (2.0 / sample_size as f64).sqrt(),
        sample_size,
        alpha,
        power,
        family: PowerFamily::Mean,
    })
}

/// Achieved power of a two-sample mean test at Cohen's d.
pub fn power_of_mean_test(
    effect_size: f64,
    sample_size: usize,
    alpha: f64,
) -> AnalysisResult<PowerResult> {
    require_positive("effect_size", effect_size)?;
    require_probability("alpha", alpha)?;
    if sample_size < 2 {
        return Err(AnalysisError::insufficient(2, sample_size, "sample size"));
    }

    let drift = effect_size * (sample_size as f64 / 2.0).sqrt();
    Ok(PowerResult {
        power: two_sided_power(drift, alpha),
        effect_size,
        sample_size,
        alpha,
        family: PowerFamily::Mean,
    })
}

/// Type I/II error rates of a mean design.
pub fn error_rates_mean(
    effect_size: f64,
    sample_size: usize,
    alpha: f64,
) -> AnalysisResult<ErrorRates> {
    let power = power_of_mean_test(effect_size, sample_size, alpha)?.power;
    Ok(ErrorRates {
        type_i: alpha,
        type_ii: 1.0 - power,
        power,
        family: PowerFamily::Mean,
    })
}

// ============================================================================
// Correlation family (Fisher z-transform)
// ============================================================================

fn require_correlation(r: f64) -> AnalysisResult<()> {
    if !r.is_finite() || r == 0.0 || r.abs() >= 1.0 {
        return Err(AnalysisError::invalid(
            "correlation",
            format!("must be non-zero with |r| < 1, got {r}"),
        ));
    }
    Ok(())
}

/// Sample size to detect a correlation `r`.
pub fn sample_size_for_correlation_test(
    correlation: f64,
    alpha: f64,
    power: f64,
) -> AnalysisResult<SampleSizeResult> {
    require_correlation(correlation)?;
    require_probability("alpha", alpha)?;
    require_probability("power", power)?;

    let (z_alpha, z_power) = z_pair(alpha, power);
    let fisher_z = correlation.atanh().abs();
    let exact = ((z_alpha + z_power) / fisher_z).powi(2) + 3.0;

    Ok(SampleSizeResult {
        sample_size: exact.ceil() as usize,
        exact,
        effect_size: correlation,
        alpha,
        power,
        family: PowerFamily::Correlation,
    })
}

/// Minimum detectable correlation for a fixed sample (n > 3).
pub fn minimum_detectable_correlation(
    sample_size: usize,
    alpha: f64,
    power: f64,
) -> AnalysisResult<DetectableEffect> {
    require_probability("alpha", alpha)?;
    require_probability("power", power)?;
    if sample_size < 4 {
        return Err(AnalysisError::insufficient(4, sample_size, "sample size"));
    }

    let (z_alpha, z_power) = z_pair(alpha, power);
    let fisher_z = (z_alpha + z_power) / ((sample_size - 3) as f64).sqrt();
    Ok(DetectableEffect {
        effect_size: fisher_z.tanh(),
        sample_size,
        alpha,
        power,
        family: PowerFamily::Correlation,
    })
}

/// Achieved power of a correlation test (n > 3).
pub fn power_of_correlation_test(
    correlation: f64,
    sample_size: usize,
    alpha: f64,
) -> AnalysisResult<PowerResult> {
    require_correlation(correlation)?;
    require_probability("alpha", alpha)?;
    if sample_size < 4 {
        return Err(AnalysisError::insufficient(4, sample_size, "sample size"));
    }

    let drift = correlation.atanh().abs() * ((sample_size - 3) as f64).sqrt();
    Ok(PowerResult {
        power: two_sided_power(drift, alpha),
        effect_size: correlation,
        sample_size,
        alpha,
        family: PowerFamily::Correlation,
    })
}

/// Type I/II error rates of a correlation design.
pub fn error_rates_correlation(
    correlation: f64,
    sample_size: usize,
    alpha: f64,
) -> AnalysisResult<ErrorRates> {
    let power = power_of_correlation_test(correlation, sample_size, alpha)?.power;
    Ok(ErrorRates {
        type_i: alpha,
        type_ii: 1.0 - power,
        power,
        family: PowerFamily::Correlation,
    })
}
