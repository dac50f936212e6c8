//! Hypothesis tests for categorical outcomes: chi-square, Fisher's exact
//! test, and z-tests for proportions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{CHI_SQUARE_MIN_TOTAL, EXPECTED_CELL_WARNING};
use crate::dist;
use crate::error::{AnalysisError, AnalysisResult};
use crate::table::ContingencyTable;
use crate::validation::{require_count_le_total, require_probability};

/// Direction of the alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alternative {
    /// Two-sided: any difference.
    #[default]
    TwoSided,
    /// Lower tail: the first quantity is smaller.
    Less,
    /// Upper tail: the first quantity is larger.
    Greater,
}

/// Result of a chi-square test (goodness-of-fit or independence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    /// Pearson chi-square statistic.
    pub statistic: f64,
    /// Two-sided p-value from the chi-square survival function.
    pub p_value: f64,
    /// Degrees of freedom: len − 1 (fit) or (r−1)(c−1) (independence).
    pub degrees_of_freedom: usize,
    /// Standardized residuals (o − e)/√e, one row per input row.
    pub residuals: Vec<Vec<f64>>,
    /// Smallest expected cell count (advisory: < 5 degrades the
    /// approximation; a warning is logged, not an error).
    pub min_expected: f64,
    /// Whether `p_value < alpha`.
    pub is_significant: bool,
}

fn chi_square_from_cells(
    observed: &[Vec<f64>],
    expected: &[Vec<f64>],
    degrees_of_freedom: usize,
    alpha: f64,
) -> ChiSquareResult {
    let mut statistic = 0.0;
    let mut min_expected = f64::INFINITY;
    let mut residuals = Vec::with_capacity(observed.len());

    for (obs_row, exp_row) in observed.iter().zip(expected) {
        let mut res_row = Vec::with_capacity(obs_row.len());
        for (&o, &e) in obs_row.iter().zip(exp_row) {
            let r = (o - e) / e.sqrt();
            statistic += r * r;
            res_row.push(r);
            min_expected = min_expected.min(e);
        }
        residuals.push(res_row);
    }

    if min_expected < EXPECTED_CELL_WARNING {
        warn!(
            min_expected,
            "chi-square approximation is unreliable: an expected cell count is below {EXPECTED_CELL_WARNING}"
        );
    }

    let p_value = dist::chi_square_sf(statistic, degrees_of_freedom as f64);
    ChiSquareResult {
        statistic,
        p_value,
        degrees_of_freedom,
        residuals,
        min_expected,
        is_significant: p_value < alpha,
    }
}

/// Chi-square goodness-of-fit test of observed frequencies against the
/// given expected frequencies.
///
/// Requires equal lengths ≥ 2, matching totals, all expected counts
/// positive, and a grand total of at least 20 observations.
pub fn chi_square_goodness_of_fit(
    observed: &[f64],
    expected: &[f64],
    alpha: f64,
) -> AnalysisResult<ChiSquareResult> {
    require_probability("alpha", alpha)?;
    if observed.len() != expected.len() {
        return Err(AnalysisError::invalid(
            "expected",
            format!(
                "length mismatch: observed has {}, expected has {}",
                observed.len(),
                expected.len()
            ),
        ));
    }
    if observed.len() < 2 {
        return Err(AnalysisError::invalid(
            "observed",
            "needs at least 2 categories",
        ));
    }
    for &o in observed {
        if !o.is_finite() || o < 0.0 {
            return Err(AnalysisError::invalid(
                "observed",
                format!("counts must be finite and non-negative, got {o}"),
            ));
        }
    }
    for &e in expected {
        if !e.is_finite() || e <= 0.0 {
            return Err(AnalysisError::invalid(
                "expected",
                format!("expected counts must be positive, got {e}"),
            ));
        }
    }

    let total: f64 = observed.iter().sum();
    let expected_total: f64 = expected.iter().sum();
    if total < CHI_SQUARE_MIN_TOTAL {
        return Err(AnalysisError::insufficient(
            CHI_SQUARE_MIN_TOTAL as usize,
            total as usize,
            "chi-square total count",
        ));
    }
    if (total - expected_total).abs() > 1e-6 * total.max(1.0) {
        return Err(AnalysisError::invalid(
            "expected",
            format!("expected frequencies sum to {expected_total}, observed to {total}"),
        ));
    }

    Ok(chi_square_from_cells(
        &[observed.to_vec()],
        &[expected.to_vec()],
        observed.len() - 1,
        alpha,
    ))
}

/// Chi-square test of independence on an R×C table. Expected counts are
/// derived from the marginals.
///
/// Requires a grand total of at least 20 and non-degenerate marginals.
pub fn chi_square_independence(
    table: &ContingencyTable,
    alpha: f64,
) -> AnalysisResult<ChiSquareResult> {
    require_probability("alpha", alpha)?;

    let total = table.total();
    if total < CHI_SQUARE_MIN_TOTAL {
        return Err(AnalysisError::insufficient(
            CHI_SQUARE_MIN_TOTAL as usize,
            total as usize,
            "chi-square total count",
        ));
    }
    for i in 0..table.nrows() {
        if table.row_total(i) == 0.0 {
            return Err(AnalysisError::invalid("table", format!("row {i} is all zero")));
        }
    }
    for j in 0..table.ncols() {
        if table.col_total(j) == 0.0 {
            return Err(AnalysisError::invalid(
                "table",
                format!("column {j} is all zero"),
            ));
        }
    }

    let expected = table.expected();
    let observed_rows: Vec<Vec<f64>> = table.iter_rows().collect();
    let expected_rows: Vec<Vec<f64>> = (0..table.nrows())
        .map(|i| (0..table.ncols()).map(|j| expected[(i, j)]).collect())
        .collect();

    Ok(chi_square_from_cells(
        &observed_rows,
        &expected_rows,
        (table.nrows() - 1) * (table.ncols() - 1),
        alpha,
    ))
}

/// Result of Fisher's exact test on a 2×2 table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FisherExactResult {
    /// Exact hypergeometric tail probability.
    pub p_value: f64,
    /// Sample odds ratio ad/bc (infinite when bc = 0, NaN when both
    /// diagonals vanish).
    pub odds_ratio: f64,
    /// The alternative the tail was computed for.
    pub alternative: Alternative,
    /// Whether `p_value < alpha`.
    pub is_significant: bool,
}

/// Fisher's exact test on a 2×2 table of integer counts.
///
/// Exact within the hypergeometric model, so there is no minimum-count
/// requirement. The two-sided p-value sums every table as or less
/// probable than the observed one.
pub fn fisher_exact_test(
    table: &ContingencyTable,
    alternative: Alternative,
    alpha: f64,
) -> AnalysisResult<FisherExactResult> {
    require_probability("alpha", alpha)?;
    let (a, b, c, d) = table.counts_2x2()?;
    for &x in &[a, b, c, d] {
        if x.fract() != 0.0 || x > u64::MAX as f64 {
            return Err(AnalysisError::invalid(
                "table",
                format!("Fisher's exact test needs integer counts, got {x}"),
            ));
        }
    }
    let (a, b, c, d) = (a as u64, b as u64, c as u64, d as u64);

    let row1 = a + b;
    let col1 = a + c;
    let n = a + b + c + d;
    if n == 0 {
        return Err(AnalysisError::invalid("table", "table is all zero"));
    }

    // Support of the hypergeometric for fixed marginals
    let k_min = col1.saturating_sub(c + d);
    let k_max = row1.min(col1);
    let pmf = |k: u64| dist::hypergeometric_pmf(k, n, row1, col1);

    let p_observed = pmf(a);
    let p_value = match alternative {
        Alternative::Less => (k_min..=a).map(pmf).sum(),
        Alternative::Greater => (a..=k_max).map(pmf).sum(),
        Alternative::TwoSided => {
            // Every table with point probability <= observed, with the
            // usual tolerance against ties lost to rounding
            let cutoff = p_observed * (1.0 + 1e-7);
            (k_min..=k_max).map(pmf).filter(|&p| p <= cutoff).sum()
        }
    };
    let p_value = f64::min(p_value, 1.0);

    let odds_ratio = {
        let numerator = (a * d) as f64;
        let denominator = (b * c) as f64;
        if denominator == 0.0 {
            if numerator == 0.0 { f64::NAN } else { f64::INFINITY }
        } else {
            numerator / denominator
        }
    };

    Ok(FisherExactResult {
        p_value,
        odds_ratio,
        alternative,
        is_significant: p_value < alpha,
    })
}

/// What a one- or two-sample proportion z-test compares against.
///
/// Exactly one comparison target exists by construction; the original
/// keyword-driven contract ("exactly one of value or a second sample")
/// is enforced by the type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZTestComparison {
    /// One-sample test against a fixed proportion in (0, 1).
    Value(f64),
    /// Two-sample pooled-variance test against a second sample.
    Sample {
        /// Successes in the second sample.
        count: u64,
        /// Observations in the second sample.
        nobs: u64,
    },
}

/// Result of a proportion z-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZTestResult {
    /// z statistic.
    pub statistic: f64,
    /// p-value under the requested alternative.
    pub p_value: f64,
    /// Observed proportion of the first sample.
    pub proportion: f64,
    /// The comparison value: the fixed null proportion, or the second
    /// sample's observed proportion.
    pub comparison_proportion: f64,
    /// The alternative tested.
    pub alternative: Alternative,
    /// Whether `p_value < alpha`.
    pub is_significant: bool,
}

/// Emit the normal-approximation advisory when a sample's success/failure
/// counts fall below the rule-of-thumb threshold.
fn warn_small_cells(label: &str, nobs: u64, p: f64) {
    let successes = nobs as f64 * p;
    let failures = nobs as f64 * (1.0 - p);
    if successes < EXPECTED_CELL_WARNING || failures < EXPECTED_CELL_WARNING {
        warn!(
            sample = label,
            successes,
            failures,
            "normal approximation is unreliable: a cell count is below {EXPECTED_CELL_WARNING}"
        );
    }
}

/// z-test for one or two proportions.
///
/// One-sample form uses the null-variance standard error
/// √(p₀(1−p₀)/n); two-sample form uses the pooled-variance z.
pub fn z_test_proportion(
    count: u64,
    nobs: u64,
    comparison: ZTestComparison,
    alternative: Alternative,
    alpha: f64,
) -> AnalysisResult<ZTestResult> {
    require_probability("alpha", alpha)?;
    require_count_le_total(count, nobs)?;

    let p_hat = count as f64 / nobs as f64;

    let (statistic, comparison_proportion) = match comparison {
        ZTestComparison::Value(p0) => {
            require_probability("value", p0)?;
            warn_small_cells("sample", nobs, p0);
            let se = (p0 * (1.0 - p0) / nobs as f64).sqrt();
            ((p_hat - p0) / se, p0)
        }
        ZTestComparison::Sample {
            count: count2,
            nobs: nobs2,
        } => {
            require_count_le_total(count2, nobs2)?;
            let p2 = count2 as f64 / nobs2 as f64;
            let pooled = (count + count2) as f64 / (nobs + nobs2) as f64;
            if pooled == 0.0 || pooled == 1.0 {
                return Err(AnalysisError::invalid(
                    "count",
                    "pooled proportion is degenerate (all successes or all failures)",
                ));
            }
            warn_small_cells("sample 1", nobs, p_hat);
            warn_small_cells("sample 2", nobs2, p2);
            let se = (pooled * (1.0 - pooled) * (1.0 / nobs as f64 + 1.0 / nobs2 as f64)).sqrt();
            ((p_hat - p2) / se, p2)
        }
    };

    let p_value = match alternative {
        Alternative::TwoSided => (2.0 * dist::normal_sf(statistic.abs())).min(1.0),
        Alternative::Less => dist::normal_cdf(statistic),
        Alternative::Greater => dist::normal_sf(statistic),
    };

    Ok(ZTestResult {
        statistic,
        p_value,
        proportion: p_hat,
        comparison_proportion,
        alternative,
        is_significant: p_value < alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independence_df_for_2x2() {
        let table = ContingencyTable::from_rows(&[&[10.0, 20.0], &[30.0, 40.0]]).unwrap();
        let result = chi_square_independence(&table, 0.05).unwrap();
        assert_eq!(result.degrees_of_freedom, 1);
        // Hand-computed Pearson statistic for this table
        assert!((result.statistic - 0.7936507936).abs() < 1e-9, "{}", result.statistic);
        assert!(result.p_value > 0.05);
        assert!(!result.is_significant);
    }

    #[test]
    fn independence_detects_association() {
        let table = ContingencyTable::from_rows(&[&[50.0, 10.0], &[10.0, 50.0]]).unwrap();
        let result = chi_square_independence(&table, 0.05).unwrap();
        assert!(result.is_significant);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn goodness_of_fit_uniform_die() {
        let observed = [18.0, 22.0, 16.0, 25.0, 20.0, 19.0];
        let expected = [20.0; 6];
        let result = chi_square_goodness_of_fit(&observed, &expected, 0.05).unwrap();
        assert_eq!(result.degrees_of_freedom, 5);
        assert_eq!(result.residuals.len(), 1);
        assert_eq!(result.residuals[0].len(), 6);
        assert!(!result.is_significant);
    }

    #[test]
    fn goodness_of_fit_rejects_mismatched_totals() {
        let err = chi_square_goodness_of_fit(&[30.0, 30.0], &[20.0, 20.0], 0.05);
        assert!(matches!(err, Err(AnalysisError::InvalidParameter { .. })));
    }

    #[test]
    fn chi_square_minimum_total() {
        let table = ContingencyTable::from_rows(&[&[2.0, 3.0], &[4.0, 5.0]]).unwrap();
        assert!(matches!(
            chi_square_independence(&table, 0.05),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn residuals_sum_of_squares_is_statistic() {
        let table = ContingencyTable::from_rows(&[&[12.0, 18.0], &[24.0, 46.0]]).unwrap();
        let result = chi_square_independence(&table, 0.05).unwrap();
        let ss: f64 = result
            .residuals
            .iter()
            .flatten()
            .map(|r| r * r)
            .sum();
        assert!((ss - result.statistic).abs() < 1e-10);
    }

    #[test]
    fn fisher_tea_tasting() {
        // Fisher's original lady-tasting-tea table
        let table = ContingencyTable::from_counts(3, 1, 1, 3);
        let result = fisher_exact_test(&table, Alternative::Greater, 0.05).unwrap();
        assert!((result.p_value - 0.2428571428).abs() < 1e-8, "{}", result.p_value);
        assert_eq!(result.odds_ratio, 9.0);
        assert!(!result.is_significant);
    }

    #[test]
    fn fisher_two_sided_known_value() {
        // scipy.stats.fisher_exact([[8, 2], [1, 5]]) two-sided
        let table = ContingencyTable::from_counts(8, 2, 1, 5);
        let result = fisher_exact_test(&table, Alternative::TwoSided, 0.05).unwrap();
        assert!((result.p_value - 0.03496503496).abs() < 1e-8, "{}", result.p_value);
        assert!(result.is_significant);
    }

    #[test]
    fn fisher_tails_are_complementary() {
        let table = ContingencyTable::from_counts(7, 3, 2, 8);
        let less = fisher_exact_test(&table, Alternative::Less, 0.05).unwrap();
        let greater = fisher_exact_test(&table, Alternative::Greater, 0.05).unwrap();
        // Tails overlap at exactly the observed table's probability
        let point = dist::hypergeometric_pmf(7, 20, 10, 9);
        assert!((less.p_value + greater.p_value - 1.0 - point).abs() < 1e-10);
    }

    #[test]
    fn fisher_rejects_non_integer_counts() {
        let table = ContingencyTable::from_rows(&[&[1.5, 2.0], &[3.0, 4.0]]).unwrap();
        assert!(fisher_exact_test(&table, Alternative::TwoSided, 0.05).is_err());
    }

    #[test]
    fn fisher_degenerate_odds_ratio() {
        let table = ContingencyTable::from_counts(5, 0, 3, 4);
        let result = fisher_exact_test(&table, Alternative::TwoSided, 0.05).unwrap();
        assert!(result.odds_ratio.is_infinite());
    }

    #[test]
    fn one_sample_z_known_value() {
        // 60/100 against p0 = 0.5: z = 0.1/sqrt(0.25/100) = 2.0
        let result = z_test_proportion(
            60,
            100,
            ZTestComparison::Value(0.5),
            Alternative::TwoSided,
            0.05,
        )
        .unwrap();
        assert!((result.statistic - 2.0).abs() < 1e-12);
        assert!((result.p_value - 0.0455002638).abs() < 1e-8);
        assert!(result.is_significant);
    }

    #[test]
    fn two_sample_z_symmetric() {
        let ab = z_test_proportion(
            120,
            1000,
            ZTestComparison::Sample {
                count: 150,
                nobs: 1000,
            },
            Alternative::TwoSided,
            0.05,
        )
        .unwrap();
        let ba = z_test_proportion(
            150,
            1000,
            ZTestComparison::Sample {
                count: 120,
                nobs: 1000,
            },
            Alternative::TwoSided,
            0.05,
        )
        .unwrap();
        assert!((ab.statistic + ba.statistic).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn one_sided_tails_sum_to_one() {
        let less = z_test_proportion(
            55,
            200,
            ZTestComparison::Value(0.3),
            Alternative::Less,
            0.05,
        )
        .unwrap();
        let greater = z_test_proportion(
            55,
            200,
            ZTestComparison::Value(0.3),
            Alternative::Greater,
            0.05,
        )
        .unwrap();
        assert!((less.p_value + greater.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn z_test_rejects_degenerate_pool() {
        let err = z_test_proportion(
            0,
            50,
            ZTestComparison::Sample { count: 0, nobs: 50 },
            Alternative::TwoSided,
            0.05,
        );
        assert!(err.is_err());
    }

    #[test]
    fn z_test_rejects_count_over_total() {
        let err = z_test_proportion(
            10,
            5,
            ZTestComparison::Value(0.5),
            Alternative::TwoSided,
            0.05,
        );
        assert!(err.is_err());
    }
}
