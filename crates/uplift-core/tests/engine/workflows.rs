//! End-to-end experiment workflows across components.

use uplift_core::context::AnalysisContext;
use uplift_core::correction::{adjust_p_values, CorrectionMethod};
use uplift_core::descriptive::describe;
use uplift_core::effect::cohens_d;
use uplift_core::hypothesis::{z_test_proportion, Alternative, ZTestComparison};
use uplift_core::intervals::{
    confidence_interval_proportion_diff, DiffMethod,
};
use uplift_core::power::{power_of_proportion_test, sample_size_for_proportion_test};
use uplift_core::sequential::{
    conditional_power, futility_boundary, sequential_test, stopping_boundaries, BoundaryMethod,
};

/// Plan, monitor, and conclude an A/B test end to end: size the sample,
/// generate monitoring boundaries, replay interim z-scores, and confirm
/// the final inference agrees with the fixed-sample machinery.
#[test]
fn ab_test_with_interim_monitoring() {
    let ctx = AnalysisContext::default();

    // Design: detect a standardized effect of 0.1 with 80% power
    let design = sample_size_for_proportion_test(0.1, ctx.default_alpha(), 0.8).unwrap();
    assert!(design.sample_size > 500);

    // Plan four interim looks
    let boundaries =
        stopping_boundaries(4, ctx.default_alpha(), BoundaryMethod::OBrienFleming, None).unwrap();
    boundaries.validate().unwrap();

    // The effect is real: z grows roughly with the square root of
    // accumulated information
    let z_scores = [1.1, 2.0, 2.6, 3.0];
    let replay = sequential_test(&z_scores, &boundaries).unwrap();
    assert!(replay.rejected_null);
    // First crossing at the third look (boundary ~2.263)
    assert_eq!(replay.first_crossing, Some(2));
    assert!(replay.stopped_early);

    // Mid-trial, continuing looked promising
    let cp = conditional_power(2.0, 0.5, ctx.default_alpha(), None).unwrap();
    assert!(cp.conditional_power > 0.5);
    let futility = futility_boundary(0.5, ctx.default_alpha(), 0.2).unwrap();
    assert!(2.0 > futility.z_boundary, "should not have looked futile");

    // Final fixed-sample confirmation on the raw counts
    let confirm = z_test_proportion(
        230,
        2000,
        ZTestComparison::Sample {
            count: 172,
            nobs: 2000,
        },
        Alternative::TwoSided,
        ctx.default_alpha(),
    )
    .unwrap();
    assert!(confirm.is_significant);
    assert!(ctx.is_significant(confirm.p_value));

    let interval = confidence_interval_proportion_diff(
        230,
        2000,
        172,
        2000,
        ctx.confidence_level(),
        DiffMethod::Normal,
    )
    .unwrap();
    assert!(interval.lower > 0.0, "interval should exclude zero");
}

/// A campaign comparison across several variants: per-variant tests, then
/// family-wise correction, then power introspection on the losers.
#[test]
fn multi_variant_campaign_with_correction() {
    let control = (200u64, 2000u64);
    let variants: [(u64, u64); 4] = [(240, 2000), (252, 2000), (206, 2000), (199, 2000)];

    let p_values: Vec<f64> = variants
        .iter()
        .map(|&(count, nobs)| {
            z_test_proportion(
                count,
                nobs,
                ZTestComparison::Sample {
                    count: control.0,
                    nobs: control.1,
                },
                Alternative::Greater,
                0.05,
            )
            .unwrap()
            .p_value
        })
        .collect();

    let corrected =
        adjust_p_values(&p_values, CorrectionMethod::HolmBonferroni, 0.05).unwrap();
    assert_eq!(corrected.adjusted.len(), 4);
    // The near-null variants must not survive correction
    assert!(!corrected.significant[2]);
    assert!(!corrected.significant[3]);
    // Correction can only lose rejections, never gain them
    for (raw, flag) in p_values.iter().zip(&corrected.significant) {
        if *flag {
            assert!(*raw < 0.05);
        }
    }

    // Underpowered follow-up: what would those near-null lifts need?
    let achieved = power_of_proportion_test(0.01, 2000, 0.05).unwrap();
    assert!(achieved.power < 0.2, "tiny lift should be underpowered");
}

/// Continuous-metric path: summaries and standardized effect for a
/// revenue-per-user comparison.
#[test]
fn continuous_metric_comparison() {
    let variant_a: Vec<f64> = (0..40).map(|i| 20.0 + (i % 7) as f64).collect();
    let variant_b: Vec<f64> = (0..40).map(|i| 22.5 + (i % 7) as f64).collect();

    let summary_a = describe(&variant_a).unwrap();
    let summary_b = describe(&variant_b).unwrap();
    assert_eq!(summary_a.n, 40);
    assert!((summary_b.mean - summary_a.mean - 2.5).abs() < 1e-9);
    // Same spread by construction
    assert!((summary_a.std_dev - summary_b.std_dev).abs() < 1e-9);

    let effect = cohens_d(&variant_b, &variant_a, true).unwrap();
    assert!(effect.d > 0.8, "shift exceeds one pooled SD: {}", effect.d);
    assert!(effect.hedges_corrected);
}
