//! Group-sequential analysis: stopping boundaries, alpha spending,
//! interim-look evaluation, conditional power, futility, and the post-hoc
//! optional-stopping correction.
//!
//! The engine holds no state between looks. A monitoring workflow
//! generates a [`BoundarySet`] once, persists it however it likes, and
//! replays its accumulating z-scores through [`sequential_test`] at each
//! interim analysis. Everything crosses the call boundary by value.
//!
//! Two distinct corrections live here and must not be conflated: the
//! boundary machinery spends the Type I budget *prospectively* across
//! planned looks, while [`optional_stopping_correction`] *retroactively*
//! penalizes a single already-observed p-value for undisclosed peeking.
//! The latter is a blunt heuristic, not a substitute for the former.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dist;
use crate::error::{AnalysisError, AnalysisResult};
use crate::validation::{require_finite, require_probability, require_unit_interval};

/// Boundary family for group-sequential monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryMethod {
    /// O'Brien–Fleming: very strict early, relaxing toward the fixed-
    /// sample critical value at full information.
    #[default]
    OBrienFleming,
    /// Pocock: one constant nominal level at every look.
    Pocock,
}

/// One interim look of a boundary sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterimLook {
    /// Fraction of planned statistical information at this look, in (0, 1].
    pub information_fraction: f64,
    /// Two-sided rejection boundary: stop when |z| ≥ this.
    pub z_boundary: f64,
    /// Alpha spent by this look alone.
    pub alpha_spent: f64,
    /// Alpha spent up to and including this look.
    pub cumulative_alpha: f64,
}

/// An ordered boundary sequence with its spending bookkeeping.
///
/// Invariants (checked by [`BoundarySet::validate`]): information
/// fractions strictly ascending in (0, 1]; cumulative alpha
/// non-decreasing and never exceeding the overall alpha beyond
/// floating-point tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySet {
    looks: Vec<InterimLook>,
    /// Total two-sided Type I budget across all looks.
    pub overall_alpha: f64,
    /// Family that generated the boundaries.
    pub method: BoundaryMethod,
}

impl BoundarySet {
    /// Number of looks.
    pub fn len(&self) -> usize {
        self.looks.len()
    }

    /// Whether the set has no looks.
    pub fn is_empty(&self) -> bool {
        self.looks.is_empty()
    }

    /// The looks in order.
    pub fn looks(&self) -> &[InterimLook] {
        &self.looks
    }

    /// Iterate the looks in order.
    pub fn iter(&self) -> impl Iterator<Item = &InterimLook> {
        self.looks.iter()
    }

    /// Check the structural invariants, for callers that persist and
    /// reload boundary sequences between looks.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.looks.is_empty() {
            return Err(AnalysisError::invalid("boundaries", "no looks"));
        }
        let mut prev_fraction = 0.0;
        let mut prev_cumulative = 0.0;
        for (i, look) in self.looks.iter().enumerate() {
            if look.information_fraction <= prev_fraction || look.information_fraction > 1.0 {
                return Err(AnalysisError::invalid(
                    "boundaries",
                    format!(
                        "information fractions must be strictly ascending in (0, 1]; \
                         look {i} has {}",
                        look.information_fraction
                    ),
                ));
            }
            if !look.z_boundary.is_finite() || look.z_boundary <= 0.0 {
                return Err(AnalysisError::invalid(
                    "boundaries",
                    format!("look {i} has non-positive boundary {}", look.z_boundary),
                ));
            }
            if look.cumulative_alpha + 1e-9 < prev_cumulative {
                return Err(AnalysisError::invalid(
                    "boundaries",
                    format!("cumulative alpha decreases at look {i}"),
                ));
            }
            prev_fraction = look.information_fraction;
            prev_cumulative = look.cumulative_alpha;
        }
        if prev_cumulative > self.overall_alpha + 1e-9 {
            return Err(AnalysisError::invalid(
                "boundaries",
                format!(
                    "cumulative alpha {prev_cumulative} exceeds the overall budget {}",
                    self.overall_alpha
                ),
            ));
        }
        Ok(())
    }
}

/// Validate a caller-supplied information-fraction schedule.
fn check_fractions(fractions: &[f64], num_looks: usize) -> AnalysisResult<()> {
    if fractions.len() != num_looks {
        return Err(AnalysisError::invalid(
            "info_fractions",
            format!(
                "schedule has {} entries for {num_looks} looks",
                fractions.len()
            ),
        ));
    }
    let mut prev = 0.0;
    for &t in fractions {
        if !t.is_finite() || t <= prev || t > 1.0 {
            return Err(AnalysisError::invalid(
                "info_fractions",
                format!("fractions must be strictly ascending in (0, 1], got {t}"),
            ));
        }
        prev = t;
    }
    Ok(())
}

/// Solve the Pocock nominal level: the p with `1 − (1−p)^k = alpha`.
///
/// Bounded bisection over [alpha/k, alpha]; falls back to the closed form
/// `1 − (1−alpha)^(1/k)` (with a warning) if the bracket fails. Either
/// way the search is a fixed number of halvings, never an open loop.
fn pocock_nominal_level(num_looks: usize, alpha: f64) -> f64 {
    let k = num_looks as f64;
    if num_looks == 1 {
        return alpha;
    }

    let overall = |p: f64| 1.0 - (1.0 - p).powf(k) - alpha;
    let mut lo = alpha / k;
    let mut hi = alpha;

    if overall(lo) > 0.0 || overall(hi) < 0.0 {
        warn!(
            num_looks,
            alpha, "Pocock bracket failed; using the closed-form nominal level"
        );
        return 1.0 - (1.0 - alpha).powf(1.0 / k);
    }

    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if overall(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-15 {
            break;
        }
    }
    0.5 * (lo + hi)
}

/// Generate the stopping boundaries for a planned sequence of looks.
///
/// With `info_fractions = None` the looks are equally spaced, ending at
/// full information. The returned sequence satisfies the [`BoundarySet`]
/// invariants; with a full-information final look, the final cumulative
/// alpha equals `alpha` up to floating-point tolerance.
pub fn stopping_boundaries(
    num_looks: usize,
    alpha: f64,
    method: BoundaryMethod,
    info_fractions: Option<&[f64]>,
) -> AnalysisResult<BoundarySet> {
    require_probability("alpha", alpha)?;
    if num_looks == 0 {
        return Err(AnalysisError::invalid("num_looks", "must be > 0"));
    }

    let fractions: Vec<f64> = match info_fractions {
        Some(schedule) => {
            check_fractions(schedule, num_looks)?;
            schedule.to_vec()
        }
        None => (1..=num_looks)
            .map(|i| i as f64 / num_looks as f64)
            .collect(),
    };

    let z_crit = dist::normal_quantile(1.0 - alpha / 2.0);
    let mut looks = Vec::with_capacity(num_looks);
    let mut previous_cumulative = 0.0;

    match method {
        BoundaryMethod::OBrienFleming => {
            for &t in &fractions {
                let z_boundary = z_crit / t.sqrt();
                // Cumulative spend implied by the boundary itself
                let cumulative_alpha = 2.0 * dist::normal_sf(z_boundary);
                looks.push(InterimLook {
                    information_fraction: t,
                    z_boundary,
                    alpha_spent: cumulative_alpha - previous_cumulative,
                    cumulative_alpha,
                });
                previous_cumulative = cumulative_alpha;
            }
        }
        BoundaryMethod::Pocock => {
            let nominal = pocock_nominal_level(num_looks, alpha);
            let z_boundary = dist::normal_quantile(1.0 - nominal / 2.0);
            for (j, &t) in fractions.iter().enumerate() {
                // Budget consumed assuming independent looks at the
                // constant nominal level
                let cumulative_alpha = 1.0 - (1.0 - nominal).powi(j as i32 + 1);
                looks.push(InterimLook {
                    information_fraction: t,
                    z_boundary,
                    alpha_spent: cumulative_alpha - previous_cumulative,
                    cumulative_alpha,
                });
                previous_cumulative = cumulative_alpha;
            }
        }
    }

    let set = BoundarySet {
        looks,
        overall_alpha: alpha,
        method,
    };
    debug_assert!(set.validate().is_ok());
    Ok(set)
}

/// Cumulative Type I error the Lan–DeMets spending function allocates by
/// information fraction `t`.
///
/// The O'Brien–Fleming-like function is `2 − 2Φ(z₍₁₋α/₂₎/√t)`; the
/// Pocock-like function is `α·ln(1 + (e−1)t)`. Both reach `alpha` at
/// `t = 1`.
pub fn alpha_spending(fraction: f64, alpha: f64, method: BoundaryMethod) -> AnalysisResult<f64> {
    require_probability("alpha", alpha)?;
    if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
        return Err(AnalysisError::invalid(
            "fraction",
            format!("must be in (0, 1], got {fraction}"),
        ));
    }

    Ok(match method {
        BoundaryMethod::OBrienFleming => {
            let z_crit = dist::normal_quantile(1.0 - alpha / 2.0);
            2.0 * dist::normal_sf(z_crit / fraction.sqrt())
        }
        BoundaryMethod::Pocock => {
            alpha * (1.0 + (core::f64::consts::E - 1.0) * fraction).ln()
        }
    })
}

/// Decision at one replayed look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookDecision {
    /// Zero-based look index.
    pub look: usize,
    /// Information fraction of the look.
    pub information_fraction: f64,
    /// Observed z-score.
    pub z_score: f64,
    /// Boundary in force at the look.
    pub z_boundary: f64,
    /// Whether |z| reached the boundary.
    pub crossed: bool,
}

/// Outcome of replaying a z-score sequence against a boundary set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialTestResult {
    /// Per-look decisions, in look order.
    pub decisions: Vec<LookDecision>,
    /// Index of the first boundary crossing, if any.
    pub first_crossing: Option<usize>,
    /// Whether the crossing happened before the final look.
    pub stopped_early: bool,
    /// Whether the null is rejected (some look crossed).
    pub rejected_null: bool,
}

/// Replay observed z-scores against a boundary set.
///
/// The experiment stops at the first look whose |z| reaches the
/// boundary; looks past that point are still reported (flagged
/// individually) so a caller can audit the whole sequence. Terminal
/// states: "crossed" at some look, or the sequence exhausted without a
/// crossing.
pub fn sequential_test(
    z_scores: &[f64],
    boundaries: &BoundarySet,
) -> AnalysisResult<SequentialTestResult> {
    boundaries.validate()?;
    if z_scores.len() != boundaries.len() {
        return Err(AnalysisError::invalid(
            "z_scores",
            format!(
                "got {} z-scores for {} looks",
                z_scores.len(),
                boundaries.len()
            ),
        ));
    }
    for &z in z_scores {
        require_finite("z_scores", z)?;
    }

    let mut decisions = Vec::with_capacity(z_scores.len());
    let mut first_crossing = None;
    for (i, (&z, look)) in z_scores.iter().zip(boundaries.iter()).enumerate() {
        let crossed = z.abs() >= look.z_boundary;
        if crossed && first_crossing.is_none() {
            first_crossing = Some(i);
        }
        decisions.push(LookDecision {
            look: i,
            information_fraction: look.information_fraction,
            z_score: z,
            z_boundary: look.z_boundary,
            crossed,
        });
    }

    Ok(SequentialTestResult {
        stopped_early: first_crossing.is_some_and(|i| i + 1 < z_scores.len()),
        rejected_null: first_crossing.is_some(),
        first_crossing,
        decisions,
    })
}

/// Conditional power at an interim look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionalPowerResult {
    /// Probability of crossing the final two-sided critical value given
    /// the interim data and the assumed drift.
    pub conditional_power: f64,
    /// Drift the projection assumed (the current-trend estimate z/√t
    /// unless the caller supplied one).
    pub drift: f64,
    /// Information fraction of the interim look.
    pub information_fraction: f64,
    /// Observed interim z-score.
    pub current_z: f64,
}

/// Probability of a significant final result given the interim z-score.
///
/// Projects the B-value `z√t` to full information under the assumed
/// drift. `drift = None` uses the current-trend estimate `z/√t`.
/// The fraction must be strictly inside (0, 1); at `t = 1` there is
/// nothing left to project.
pub fn conditional_power(
    current_z: f64,
    information_fraction: f64,
    alpha: f64,
    drift: Option<f64>,
) -> AnalysisResult<ConditionalPowerResult> {
    require_probability("alpha", alpha)?;
    require_probability("information_fraction", information_fraction)?;
    require_finite("current_z", current_z)?;
    if let Some(theta) = drift {
        require_finite("drift", theta)?;
    }

    let t = information_fraction;
    let theta = drift.unwrap_or(current_z / t.sqrt());
    let b_value = current_z * t.sqrt();
    let remaining = 1.0 - t;

    let z_crit = dist::normal_quantile(1.0 - alpha / 2.0);
    let numerator = z_crit - b_value - theta * remaining;
    let conditional_power = dist::normal_sf(numerator / remaining.sqrt());

    Ok(ConditionalPowerResult {
        conditional_power,
        drift: theta,
        information_fraction,
        current_z,
    })
}

/// Futility boundary at an interim look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FutilityBoundary {
    /// Interim z below which the trial is futile at this look.
    pub z_boundary: f64,
    /// Information fraction of the look.
    pub information_fraction: f64,
    /// Conditional-power floor defining futility.
    pub conditional_power_floor: f64,
}

/// The interim z at which current-trend conditional power equals the
/// floor: observing less than this, continuing is unlikely to succeed.
///
/// Closed form `z = √t · (z₍₁₋α/₂₎ − Φ⁻¹(1−floor)·√(1−t))`, obtained by
/// inverting the current-trend conditional-power formula. Independent of
/// any efficacy boundary; callers combine the two signals as they see
/// fit.
pub fn futility_boundary(
    information_fraction: f64,
    alpha: f64,
    conditional_power_floor: f64,
) -> AnalysisResult<FutilityBoundary> {
    require_probability("alpha", alpha)?;
    require_probability("information_fraction", information_fraction)?;
    require_probability("conditional_power_floor", conditional_power_floor)?;

    let t = information_fraction;
    let z_crit = dist::normal_quantile(1.0 - alpha / 2.0);
    let z_floor = dist::normal_quantile(1.0 - conditional_power_floor);
    let z_boundary = t.sqrt() * (z_crit - z_floor * (1.0 - t).sqrt());

    Ok(FutilityBoundary {
        z_boundary,
        information_fraction,
        conditional_power_floor,
    })
}

/// Penalty scheme for a p-value observed under undisclosed repeated looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionalStoppingMethod {
    /// Multiply by the number of looks, cap at 1.
    Bonferroni,
    /// 1 − (1 − p)^k.
    Sidak,
    /// Shift the observed z by the expected maximum of k standard
    /// normals (Blom's order-statistic approximation). A best-effort
    /// heuristic: approximate, and NOT interchangeable with the
    /// boundary-based sequential machinery above.
    ExpectedMax,
}

/// A retroactively corrected p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionalStoppingResult {
    /// The p-value as observed.
    pub original_p: f64,
    /// The penalized p-value, ≥ the original and capped at 1.
    pub adjusted_p: f64,
    /// Number of looks the observer could have stopped at.
    pub num_looks: usize,
    /// Penalty scheme applied.
    pub method: OptionalStoppingMethod,
}

/// Retroactively penalize one observed p-value for `num_looks` possible
/// stopping points.
///
/// This is the damage-control path for an experiment that was peeked at
/// without a monitoring plan. It corrects a single number after the
/// fact; it does not reconstruct the boundary sequence the experiment
/// should have used.
pub fn optional_stopping_correction(
    p_value: f64,
    num_looks: usize,
    method: OptionalStoppingMethod,
) -> AnalysisResult<OptionalStoppingResult> {
    require_unit_interval("p_value", p_value)?;
    if num_looks == 0 {
        return Err(AnalysisError::invalid("num_looks", "must be > 0"));
    }

    let k = num_looks as f64;
    let adjusted_p = match method {
        OptionalStoppingMethod::Bonferroni => (p_value * k).min(1.0),
        OptionalStoppingMethod::Sidak => 1.0 - (1.0 - p_value).powf(k),
        OptionalStoppingMethod::ExpectedMax => {
            if p_value == 0.0 || num_looks == 1 {
                p_value
            } else {
                // Blom: E[max of k] ~ Phi^-1((k - 0.375)/(k + 0.25))
                let expected_max = dist::normal_quantile((k - 0.375) / (k + 0.25));
                let observed_z = dist::normal_quantile(1.0 - p_value / 2.0);
                let shifted = (observed_z - expected_max).max(0.0);
                (2.0 * dist::normal_sf(shifted)).min(1.0)
            }
        }
    };

    Ok(OptionalStoppingResult {
        original_p: p_value,
        adjusted_p,
        num_looks,
        method,
    })
}
