//! Effect sizes: Cohen's d, odds ratio, relative risk, and
//! number-needed-to-treat.
//!
//! Ratio measures report a log-scale delta-method interval and apply
//! Haldane-Anscombe smoothing if and only if a required cell is exactly
//! zero, never pre-emptively.

use serde::{Deserialize, Serialize};

use crate::constants::COHENS_D_CUTS;
use crate::descriptive;
use crate::dist;
use crate::error::{AnalysisError, AnalysisResult};
use crate::table::ContingencyTable;
use crate::validation::{require_probability, require_unit_interval};

/// Bucketed interpretation of a standardized effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectMagnitude {
    /// |d| < 0.2.
    Negligible,
    /// 0.2 ≤ |d| < 0.5.
    Small,
    /// 0.5 ≤ |d| < 0.8.
    Medium,
    /// |d| ≥ 0.8.
    Large,
}

impl EffectMagnitude {
    /// Bucket a standardized difference by the conventional cut points.
    pub fn from_standardized(d: f64) -> Self {
        let abs = d.abs();
        if abs < COHENS_D_CUTS[0] {
            Self::Negligible
        } else if abs < COHENS_D_CUTS[1] {
            Self::Small
        } else if abs < COHENS_D_CUTS[2] {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// Cohen's d between two groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohensDResult {
    /// Standardized mean difference (mean_a − mean_b) / pooled SD.
    pub d: f64,
    /// Pooled standard deviation.
    pub pooled_std_dev: f64,
    /// Whether the small-sample (Hedges) correction was applied.
    pub hedges_corrected: bool,
    /// Conventional magnitude bucket.
    pub magnitude: EffectMagnitude,
}

/// Cohen's d with optional small-sample (Hedges) correction.
///
/// Each group needs at least 2 observations and the pooled variance must
/// be positive.
pub fn cohens_d(
    group_a: &[f64],
    group_b: &[f64],
    hedges_correction: bool,
) -> AnalysisResult<CohensDResult> {
    if group_a.len() < 2 || group_b.len() < 2 {
        return Err(AnalysisError::insufficient(
            2,
            group_a.len().min(group_b.len()),
            "Cohen's d group",
        ));
    }

    let n_a = group_a.len() as f64;
    let n_b = group_b.len() as f64;
    let mean_a = descriptive::mean(group_a)?;
    let mean_b = descriptive::mean(group_b)?;
    let var_a = descriptive::sample_variance(group_a)?;
    let var_b = descriptive::sample_variance(group_b)?;

    let pooled_var = ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / (n_a + n_b - 2.0);
    if pooled_var <= 0.0 {
        return Err(AnalysisError::invalid(
            "group_a",
            "pooled variance is zero; the standardized difference is undefined",
        ));
    }
    let pooled_std_dev = pooled_var.sqrt();

    let mut d = (mean_a - mean_b) / pooled_std_dev;
    if hedges_correction {
        d *= 1.0 - 3.0 / (4.0 * (n_a + n_b) - 9.0);
    }

    Ok(CohensDResult {
        d,
        pooled_std_dev,
        hedges_corrected: hedges_correction,
        magnitude: EffectMagnitude::from_standardized(d),
    })
}

/// A ratio effect measure (odds ratio or relative risk) with its
/// log-scale interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    /// Point estimate of the ratio.
    pub estimate: f64,
    /// Natural log of the estimate.
    pub log_estimate: f64,
    /// Delta-method standard error of the log estimate.
    pub std_error: f64,
    /// Lower confidence bound (back-transformed).
    pub lower: f64,
    /// Upper confidence bound (back-transformed).
    pub upper: f64,
    /// Requested confidence level.
    pub confidence: f64,
    /// Whether Haldane smoothing fired (a required cell was zero).
    pub haldane_applied: bool,
}

fn ratio_from_logs(
    log_estimate: f64,
    std_error: f64,
    confidence: f64,
    haldane_applied: bool,
) -> RatioResult {
    let z = dist::normal_quantile(1.0 - (1.0 - confidence) / 2.0);
    RatioResult {
        estimate: log_estimate.exp(),
        log_estimate,
        std_error,
        lower: (log_estimate - z * std_error).exp(),
        upper: (log_estimate + z * std_error).exp(),
        confidence,
        haldane_applied,
    }
}

/// Odds ratio of a 2×2 table `[[a, b], [c, d]]`: (a·d)/(b·c).
///
/// All four cells are required; if any is zero the Haldane-smoothed table
/// is used instead.
pub fn odds_ratio(table: &ContingencyTable, confidence: f64) -> AnalysisResult<RatioResult> {
    require_probability("confidence", confidence)?;
    let (a, b, c, d) = table.counts_2x2()?;

    let needs_smoothing = a == 0.0 || b == 0.0 || c == 0.0 || d == 0.0;
    let (a, b, c, d) = if needs_smoothing {
        table.haldane_smoothed().counts_2x2()?
    } else {
        (a, b, c, d)
    };

    let log_or = (a * d / (b * c)).ln();
    let se = (1.0 / a + 1.0 / b + 1.0 / c + 1.0 / d).sqrt();
    Ok(ratio_from_logs(log_or, se, confidence, needs_smoothing))
}

/// Relative risk of a 2×2 table `[[a, b], [c, d]]` with rows = groups and
/// the first column the event: (a/(a+b)) / (c/(c+d)).
///
/// The event cells a and c are required; if either is zero the
/// Haldane-smoothed table is used. Both row totals must be positive.
pub fn relative_risk(table: &ContingencyTable, confidence: f64) -> AnalysisResult<RatioResult> {
    require_probability("confidence", confidence)?;
    let (a, b, c, d) = table.counts_2x2()?;

    if a + b == 0.0 || c + d == 0.0 {
        return Err(AnalysisError::invalid(
            "table",
            "both group rows must contain observations",
        ));
    }

    let needs_smoothing = a == 0.0 || c == 0.0;
    let (a, b, c, d) = if needs_smoothing {
        table.haldane_smoothed().counts_2x2()?
    } else {
        (a, b, c, d)
    };

    let risk1 = a / (a + b);
    let risk2 = c / (c + d);
    let log_rr = (risk1 / risk2).ln();
    let se = (1.0 / a - 1.0 / (a + b) + 1.0 / c - 1.0 / (c + d)).sqrt();
    Ok(ratio_from_logs(log_rr, se, confidence, needs_smoothing))
}

/// Direction of the treatment effect behind an NNT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreatmentEffect {
    /// Treatment risk below control risk; NNT counts patients treated per
    /// event prevented.
    Benefit,
    /// Treatment risk above control risk; the (negative) NNT counts
    /// patients treated per event caused.
    Harm,
    /// Identical risks; infinitely many patients per event.
    NoEffect,
}

/// Number needed to treat, derived from the absolute risk reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NntResult {
    /// Absolute risk reduction, control − treatment.
    pub absolute_risk_reduction: f64,
    /// Lower confidence bound of the ARR.
    pub arr_lower: f64,
    /// Upper confidence bound of the ARR.
    pub arr_upper: f64,
    /// Signed NNT = 1/ARR: positive for benefit, negative for harm
    /// (number needed to harm), +∞ for no effect.
    pub nnt: f64,
    /// Lower NNT bound (±∞ when the ARR interval reaches zero from the
    /// corresponding side).
    pub nnt_lower: f64,
    /// Upper NNT bound.
    pub nnt_upper: f64,
    /// Requested confidence level.
    pub confidence: f64,
    /// Direction of the effect.
    pub interpretation: TreatmentEffect,
}

/// Number needed to treat from the event risks of the two arms.
///
/// The NNT bounds are each ARR bound mapped through x ↦ 1/x. Which ARR
/// bound feeds which NNT bound depends on the sign of the ARR, and a
/// bound on the far side of zero maps to ±∞. Simply inverting the
/// interval endpoints in place is wrong whenever the interval reaches
/// zero.
pub fn number_needed_to_treat(
    risk_treatment: f64,
    risk_control: f64,
    n_treatment: u64,
    n_control: u64,
    confidence: f64,
) -> AnalysisResult<NntResult> {
    require_probability("confidence", confidence)?;
    require_unit_interval("risk_treatment", risk_treatment)?;
    require_unit_interval("risk_control", risk_control)?;
    if n_treatment == 0 || n_control == 0 {
        return Err(AnalysisError::invalid("n_treatment", "arm sizes must be > 0"));
    }

    let arr = risk_control - risk_treatment;
    let se = (risk_treatment * (1.0 - risk_treatment) / n_treatment as f64
        + risk_control * (1.0 - risk_control) / n_control as f64)
        .sqrt();
    let z = dist::normal_quantile(1.0 - (1.0 - confidence) / 2.0);
    let arr_lower = arr - z * se;
    let arr_upper = arr + z * se;

    let (nnt, nnt_lower, nnt_upper, interpretation) = if arr > 0.0 {
        // Benefit: the tighter bound comes from the larger ARR
        let lower = 1.0 / arr_upper;
        let upper = if arr_lower > 0.0 {
            1.0 / arr_lower
        } else {
            f64::INFINITY
        };
        (1.0 / arr, lower, upper, TreatmentEffect::Benefit)
    } else if arr < 0.0 {
        // Harm: negative NNT (number needed to harm)
        let lower = if arr_upper < 0.0 {
            1.0 / arr_upper
        } else {
            f64::NEG_INFINITY
        };
        let upper = 1.0 / arr_lower;
        (1.0 / arr, lower, upper, TreatmentEffect::Harm)
    } else {
        // No effect: infinite NNT; the benefit-side reciprocal is the
        // only finite bound available
        let lower = if arr_upper > 0.0 {
            1.0 / arr_upper
        } else {
            f64::INFINITY
        };
        (f64::INFINITY, lower, f64::INFINITY, TreatmentEffect::NoEffect)
    };

    Ok(NntResult {
        absolute_risk_reduction: arr,
        arr_lower,
        arr_upper,
        nnt,
        nnt_lower,
        nnt_upper,
        confidence,
        interpretation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cohens_d_known_value() {
        // Both groups have variance 16/5; means differ by 2
        let a = [8.0, 10.0, 12.0, 10.0, 8.0, 12.0];
        let b = [6.0, 8.0, 10.0, 8.0, 6.0, 10.0];
        let result = cohens_d(&a, &b, false).unwrap();
        let expected = 2.0 / (16.0_f64 / 5.0).sqrt();
        assert!((result.d - expected).abs() < 1e-10, "{}", result.d);
        assert_eq!(result.magnitude, EffectMagnitude::Large);
    }

    #[test]
    fn hedges_correction_shrinks_d() {
        let a = [8.0, 10.0, 12.0, 10.0];
        let b = [6.0, 8.0, 10.0, 8.0];
        let raw = cohens_d(&a, &b, false).unwrap();
        let corrected = cohens_d(&a, &b, true).unwrap();
        assert!(corrected.d.abs() < raw.d.abs());
        // J = 1 - 3/(4*8 - 9) = 20/23
        assert!((corrected.d - raw.d * (1.0 - 3.0 / 23.0)).abs() < 1e-12);
    }

    #[test]
    fn magnitude_buckets() {
        assert_eq!(
            EffectMagnitude::from_standardized(0.1),
            EffectMagnitude::Negligible
        );
        assert_eq!(
            EffectMagnitude::from_standardized(-0.3),
            EffectMagnitude::Small
        );
        assert_eq!(
            EffectMagnitude::from_standardized(0.5),
            EffectMagnitude::Medium
        );
        assert_eq!(
            EffectMagnitude::from_standardized(-2.0),
            EffectMagnitude::Large
        );
    }

    #[test]
    fn zero_variance_rejected() {
        assert!(cohens_d(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0], false).is_err());
    }

    #[test]
    fn odds_ratio_known_value() {
        // (20*15)/(10*5) = 6
        let table = ContingencyTable::from_counts(20, 10, 5, 15);
        let result = odds_ratio(&table, 0.95).unwrap();
        assert!((result.estimate - 6.0).abs() < 1e-10);
        assert!(!result.haldane_applied);
        assert!(result.lower < 6.0 && 6.0 < result.upper);
    }

    #[test]
    fn odds_ratio_smooths_only_on_zero() {
        let clean = ContingencyTable::from_counts(20, 10, 5, 15);
        assert!(!odds_ratio(&clean, 0.95).unwrap().haldane_applied);

        let zero_cell = ContingencyTable::from_counts(20, 0, 5, 15);
        let result = odds_ratio(&zero_cell, 0.95).unwrap();
        assert!(result.haldane_applied);
        // (20.5 * 15.5) / (0.5 * 5.5)
        assert!((result.estimate - (20.5 * 15.5) / (0.5 * 5.5)).abs() < 1e-9);
        assert!(result.estimate.is_finite());
    }

    #[test]
    fn relative_risk_known_value() {
        // risk1 = 20/30, risk2 = 10/30 -> RR = 2
        let table = ContingencyTable::from_counts(20, 10, 10, 20);
        let result = relative_risk(&table, 0.95).unwrap();
        assert!((result.estimate - 2.0).abs() < 1e-10);
        assert!(!result.haldane_applied);
    }

    #[test]
    fn relative_risk_smooths_on_zero_event_cell() {
        let table = ContingencyTable::from_counts(0, 30, 10, 20);
        let result = relative_risk(&table, 0.95).unwrap();
        assert!(result.haldane_applied);
        assert!(result.estimate > 0.0 && result.estimate.is_finite());

        // A zero in a non-event cell does not trigger smoothing
        let table = ContingencyTable::from_counts(30, 0, 10, 20);
        let result = relative_risk(&table, 0.95).unwrap();
        assert!(!result.haldane_applied);
    }

    #[test]
    fn nnt_benefit_bounds_swap() {
        let result = number_needed_to_treat(0.10, 0.20, 500, 500, 0.95).unwrap();
        assert!((result.absolute_risk_reduction - 0.10).abs() < 1e-12);
        assert_eq!(result.interpretation, TreatmentEffect::Benefit);
        assert!((result.nnt - 10.0).abs() < 1e-12);
        // The lower NNT bound comes from the UPPER ARR bound
        assert!((result.nnt_lower - 1.0 / result.arr_upper).abs() < 1e-12);
        assert!((result.nnt_upper - 1.0 / result.arr_lower).abs() < 1e-12);
        assert!(result.nnt_lower < result.nnt && result.nnt < result.nnt_upper);
    }

    #[test]
    fn nnt_harm_is_negative() {
        let result = number_needed_to_treat(0.30, 0.10, 500, 500, 0.95).unwrap();
        assert_eq!(result.interpretation, TreatmentEffect::Harm);
        assert!((result.nnt + 5.0).abs() < 1e-12);
        assert!(result.nnt_lower < result.nnt && result.nnt < result.nnt_upper);
        assert!(result.nnt_upper < 0.0);
    }

    #[test]
    fn nnt_no_effect_is_infinite() {
        let result = number_needed_to_treat(0.15, 0.15, 400, 400, 0.95).unwrap();
        assert_eq!(result.interpretation, TreatmentEffect::NoEffect);
        assert_eq!(result.absolute_risk_reduction, 0.0);
        assert!(result.nnt.is_infinite() && result.nnt > 0.0);
        assert!(result.nnt_upper.is_infinite());
    }

    #[test]
    fn nnt_interval_spanning_zero_goes_unbounded() {
        // Tiny samples: the ARR interval crosses zero, so the far NNT
        // bound must be infinite, not a finite inverted endpoint
        let result = number_needed_to_treat(0.18, 0.20, 50, 50, 0.95).unwrap();
        assert!(result.arr_lower < 0.0 && result.arr_upper > 0.0);
        assert_eq!(result.interpretation, TreatmentEffect::Benefit);
        assert!(result.nnt_upper.is_infinite());
        assert!(result.nnt_lower.is_finite());
    }
}
