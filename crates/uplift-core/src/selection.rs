//! Model selection: the likelihood-ratio test and information criteria.

use serde::{Deserialize, Serialize};

use crate::dist;
use crate::error::{AnalysisError, AnalysisResult};
use crate::validation::{require_finite, require_probability};

/// Result of a likelihood-ratio test between two nested models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodRatioResult {
    /// 2 · (loglik_complex − loglik_simple). Can be negative when the
    /// complex model fits worse; the survival function then reports
    /// p = 1.
    pub statistic: f64,
    /// Parameter-count difference between the models.
    pub degrees_of_freedom: usize,
    /// Chi-square tail probability of the statistic.
    pub p_value: f64,
    /// Whether `p_value < alpha`.
    pub is_significant: bool,
}

/// Likelihood-ratio test of a simple model against a nested complex one.
///
/// The complex model must have strictly more parameters; equality or
/// reversal is an input error, not a degenerate test.
pub fn likelihood_ratio_test(
    loglik_simple: f64,
    num_params_simple: usize,
    loglik_complex: f64,
    num_params_complex: usize,
    alpha: f64,
) -> AnalysisResult<LikelihoodRatioResult> {
    require_probability("alpha", alpha)?;
    require_finite("loglik_simple", loglik_simple)?;
    require_finite("loglik_complex", loglik_complex)?;
    if num_params_complex <= num_params_simple {
        return Err(AnalysisError::invalid(
            "num_params_complex",
            format!(
                "complex model must have more parameters than the simple one \
                 ({num_params_complex} vs {num_params_simple})"
            ),
        ));
    }

    let statistic = 2.0 * (loglik_complex - loglik_simple);
    let degrees_of_freedom = num_params_complex - num_params_simple;
    let p_value = dist::chi_square_sf(statistic, degrees_of_freedom as f64);

    Ok(LikelihoodRatioResult {
        statistic,
        degrees_of_freedom,
        p_value,
        is_significant: p_value < alpha,
    })
}

/// Information criteria for one fitted model.
///
/// Lower is better for every criterion. AICc is +∞ when its small-sample
/// denominator n − k − 1 is not positive; the others stay finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationCriteria {
    /// Akaike: 2k − 2·loglik.
    pub aic: f64,
    /// Bayesian: k·ln(n) − 2·loglik.
    pub bic: f64,
    /// Small-sample corrected AIC.
    pub aicc: f64,
    /// Hannan–Quinn: 2k·ln(ln(n)) − 2·loglik.
    pub hqic: f64,
    /// The log-likelihood supplied.
    pub log_likelihood: f64,
    /// Parameter count supplied.
    pub num_params: usize,
    /// Sample size supplied.
    pub sample_size: usize,
}

/// Compute AIC, BIC, AICc, and HQIC from one (log-likelihood,
/// parameter-count, sample-size) triple.
pub fn model_selection_criteria(
    log_likelihood: f64,
    num_params: usize,
    sample_size: usize,
) -> AnalysisResult<InformationCriteria> {
    require_finite("log_likelihood", log_likelihood)?;
    if num_params == 0 {
        return Err(AnalysisError::invalid("num_params", "must be > 0"));
    }
    if sample_size < 2 {
        return Err(AnalysisError::insufficient(2, sample_size, "sample size"));
    }

    let k = num_params as f64;
    let n = sample_size as f64;
    let deviance = -2.0 * log_likelihood;

    let aic = 2.0 * k + deviance;
    let bic = k * n.ln() + deviance;
    let aicc = if sample_size > num_params + 1 {
        aic + 2.0 * k * (k + 1.0) / (n - k - 1.0)
    } else {
        f64::INFINITY
    };
    let hqic = 2.0 * k * n.ln().ln() + deviance;

    Ok(InformationCriteria {
        aic,
        bic,
        aicc,
        hqic,
        log_likelihood,
        num_params,
        sample_size,
    })
}
