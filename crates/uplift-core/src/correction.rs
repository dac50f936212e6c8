//! Multiple-comparison correction: p-value adjustment and direct alpha
//! adjustment.
//!
//! Family-wise procedures (Bonferroni, Holm, Šidák) control the chance of
//! any false rejection; the Benjamini procedures control the false
//! discovery rate. All adjusted values are capped at 1, and the stepwise
//! procedures enforce their monotonicity invariants explicitly.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::validation::{require_min_len, require_probability, require_unit_interval};

/// p-value adjustment procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionMethod {
    /// Multiply by n, cap at 1.
    Bonferroni,
    /// Holm's step-down refinement of Bonferroni.
    HolmBonferroni,
    /// Benjamini–Hochberg step-up FDR control.
    BenjaminiHochberg,
    /// Benjamini–Yekutieli: BH scaled by the harmonic sum, valid under
    /// arbitrary dependence.
    BenjaminiYekutieli,
    /// Šidák: 1 − (1 − p)^n.
    Sidak,
}

/// Adjusted p-values with per-test significance flags.
///
/// The three sequences are parallel and equally long; `adjusted[i]`
/// always corresponds to `original[i]` regardless of the sorting the
/// stepwise procedures do internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// The p-values as supplied.
    pub original: Vec<f64>,
    /// Adjusted p-values, capped at 1.
    pub adjusted: Vec<f64>,
    /// Whether each adjusted value is below alpha.
    pub significant: Vec<bool>,
    /// The procedure applied.
    pub method: CorrectionMethod,
    /// Significance level the flags were computed against.
    pub alpha: f64,
}

/// Indices that sort `p_values` ascending.
fn ascending_order(p_values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..p_values.len()).collect();
    order.sort_by(|&i, &j| p_values[i].total_cmp(&p_values[j]));
    order
}

/// Adjust a family of p-values by the selected procedure.
pub fn adjust_p_values(
    p_values: &[f64],
    method: CorrectionMethod,
    alpha: f64,
) -> AnalysisResult<CorrectionResult> {
    require_probability("alpha", alpha)?;
    require_min_len("p_values", p_values.len(), 1)?;
    for &p in p_values {
        require_unit_interval("p_values", p)?;
    }

    let n = p_values.len();
    let n_f = n as f64;
    let mut adjusted = vec![0.0; n];

    match method {
        CorrectionMethod::Bonferroni => {
            for (out, &p) in adjusted.iter_mut().zip(p_values) {
                *out = (p * n_f).min(1.0);
            }
        }
        CorrectionMethod::Sidak => {
            for (out, &p) in adjusted.iter_mut().zip(p_values) {
                *out = 1.0 - (1.0 - p).powf(n_f);
            }
        }
        CorrectionMethod::HolmBonferroni => {
            // Step-down: multiplier (n - rank), then a forward running max
            // so adjusted values never decrease along the sorted order
            let order = ascending_order(p_values);
            let mut running_max = 0.0_f64;
            for (rank, &idx) in order.iter().enumerate() {
                let candidate = ((n - rank) as f64 * p_values[idx]).min(1.0);
                running_max = running_max.max(candidate);
                adjusted[idx] = running_max;
            }
        }
        CorrectionMethod::BenjaminiHochberg | CorrectionMethod::BenjaminiYekutieli => {
            // Step-up: divisor rank/n, then a backward running min so
            // adjusted values never increase along the sorted order
            let scale = match method {
                CorrectionMethod::BenjaminiYekutieli => {
                    (1..=n).map(|i| 1.0 / i as f64).sum::<f64>()
                }
                _ => 1.0,
            };
            let order = ascending_order(p_values);
            let mut running_min = 1.0_f64;
            for (rank, &idx) in order.iter().enumerate().rev() {
                let candidate =
                    (p_values[idx] * scale * n_f / (rank + 1) as f64).min(1.0);
                running_min = running_min.min(candidate);
                adjusted[idx] = running_min;
            }
        }
    }

    let significant = adjusted.iter().map(|&p| p < alpha).collect();
    Ok(CorrectionResult {
        original: p_values.to_vec(),
        adjusted,
        significant,
        method,
        alpha,
    })
}

/// Threshold adjustment method for [`adjust_alpha`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlphaAdjustment {
    /// alpha / n, exactly.
    Bonferroni,
    /// 1 − (1 − alpha)^(1/n).
    Sidak,
    /// No adjustment.
    None,
}

/// An adjusted per-comparison significance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedAlpha {
    /// The per-comparison threshold to test each raw p-value against.
    pub adjusted_alpha: f64,
    /// The family-wise level being protected.
    pub original_alpha: f64,
    /// Number of comparisons in the family.
    pub num_comparisons: usize,
    /// Adjustment used.
    pub method: AlphaAdjustment,
}

/// Adjust the significance threshold itself (rather than the p-values).
pub fn adjust_alpha(
    alpha: f64,
    num_comparisons: usize,
    method: AlphaAdjustment,
) -> AnalysisResult<AdjustedAlpha> {
    require_probability("alpha", alpha)?;
    if num_comparisons == 0 {
        return Err(AnalysisError::invalid("num_comparisons", "must be > 0"));
    }

    let n = num_comparisons as f64;
    let adjusted_alpha = match method {
        AlphaAdjustment::Bonferroni => alpha / n,
        AlphaAdjustment::Sidak => 1.0 - (1.0 - alpha).powf(1.0 / n),
        AlphaAdjustment::None => alpha,
    };

    Ok(AdjustedAlpha {
        adjusted_alpha,
        original_alpha: alpha,
        num_comparisons,
        method,
    })
}
