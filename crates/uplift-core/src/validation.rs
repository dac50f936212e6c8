//! Input-contract checks shared by every statistical procedure.
//!
//! Each check returns `Ok(())` or the violated constraint as an
//! [`AnalysisError`]. Public procedures run their checks before any
//! computation, so failures never leave partial work behind.

use crate::constants::DEFAULT_MIN_SAMPLES;
use crate::error::{AnalysisError, AnalysisResult};

/// Require a probability-like level strictly inside (0, 1).
///
/// Used for significance levels, confidence levels, power targets and
/// information fractions below 1.
pub fn require_probability(name: &'static str, value: f64) -> AnalysisResult<()> {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(AnalysisError::invalid(
            name,
            format!("must be in (0, 1), got {value}"),
        ));
    }
    Ok(())
}

/// Require a value in the closed unit interval [0, 1] (proportions,
/// p-values, risks).
pub fn require_unit_interval(name: &'static str, value: f64) -> AnalysisResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AnalysisError::invalid(
            name,
            format!("must be in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

/// Require a finite value.
pub fn require_finite(name: &'static str, value: f64) -> AnalysisResult<()> {
    if !value.is_finite() {
        return Err(AnalysisError::invalid(
            name,
            format!("must be finite, got {value}"),
        ));
    }
    Ok(())
}

/// Require a finite, strictly positive value.
pub fn require_positive(name: &'static str, value: f64) -> AnalysisResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AnalysisError::invalid(
            name,
            format!("must be > 0, got {value}"),
        ));
    }
    Ok(())
}

/// Require every element of a sample to be finite.
pub fn require_all_finite(name: &'static str, sample: &[f64]) -> AnalysisResult<()> {
    if let Some(bad) = sample.iter().find(|x| !x.is_finite()) {
        return Err(AnalysisError::invalid(
            name,
            format!("sample contains a non-finite value ({bad})"),
        ));
    }
    Ok(())
}

/// Require a sample of at least `min` elements. This is a shape contract,
/// not a statistical sufficiency rule; see [`check_sufficient_data`].
pub fn require_min_len(name: &'static str, len: usize, min: usize) -> AnalysisResult<()> {
    if len < min {
        return Err(AnalysisError::invalid(
            name,
            format!("needs at least {min} elements, got {len}"),
        ));
    }
    Ok(())
}

/// Require a positive number of observations with `count <= nobs`.
pub fn require_count_le_total(count: u64, nobs: u64) -> AnalysisResult<()> {
    if nobs == 0 {
        return Err(AnalysisError::invalid("nobs", "must be > 0"));
    }
    if count > nobs {
        return Err(AnalysisError::invalid(
            "count",
            format!("count ({count}) exceeds number of observations ({nobs})"),
        ));
    }
    Ok(())
}

/// Statistical sufficiency gate: fail with [`AnalysisError::InsufficientData`]
/// when the sample is smaller than `min_samples` (default 30).
pub fn check_sufficient_data(sample: &[f64], min_samples: Option<usize>) -> AnalysisResult<()> {
    let needed = min_samples.unwrap_or(DEFAULT_MIN_SAMPLES);
    if sample.len() < needed {
        return Err(AnalysisError::insufficient(needed, sample.len(), "sample"));
    }
    Ok(())
}
