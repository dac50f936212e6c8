//! Documented numerical properties, checked through the public API.

use uplift_core::correction::{adjust_alpha, adjust_p_values, AlphaAdjustment, CorrectionMethod};
use uplift_core::effect::{
    number_needed_to_treat, odds_ratio, relative_risk, TreatmentEffect,
};
use uplift_core::hypothesis::chi_square_independence;
use uplift_core::intervals::confidence_interval_mean;
use uplift_core::power::sample_size_for_proportion_test;
use uplift_core::sequential::{stopping_boundaries, BoundaryMethod};
use uplift_core::ContingencyTable;

#[test]
fn haldane_fires_iff_a_required_cell_is_zero() {
    // No zero cells: never smoothed
    for table in [
        ContingencyTable::from_counts(12, 8, 7, 13),
        ContingencyTable::from_counts(1, 1, 1, 1),
        ContingencyTable::from_counts(100, 1, 1, 100),
    ] {
        assert!(!odds_ratio(&table, 0.95).unwrap().haldane_applied);
        assert!(!relative_risk(&table, 0.95).unwrap().haldane_applied);
    }

    // Any zero cell: the odds ratio always smooths
    for (a, b, c, d) in [(0, 8, 7, 13), (12, 0, 7, 13), (12, 8, 0, 13), (12, 8, 7, 0)] {
        let table = ContingencyTable::from_counts(a, b, c, d);
        let result = odds_ratio(&table, 0.95).unwrap();
        assert!(result.haldane_applied, "OR did not smooth for {a},{b},{c},{d}");
        assert!(result.estimate.is_finite() && result.estimate > 0.0);
    }

    // Relative risk requires only the event cells a and c
    let event_zero = ContingencyTable::from_counts(0, 20, 7, 13);
    assert!(relative_risk(&event_zero, 0.95).unwrap().haldane_applied);
    let non_event_zero = ContingencyTable::from_counts(12, 0, 7, 13);
    assert!(!relative_risk(&non_event_zero, 0.95).unwrap().haldane_applied);
}

#[test]
fn stepwise_corrections_are_monotone_in_sorted_order() {
    let ps: [f64; 7] = [0.002, 0.09, 0.013, 0.048, 0.6, 0.031, 0.001];

    let mut order: Vec<usize> = (0..ps.len()).collect();
    order.sort_by(|&i, &j| ps[i].total_cmp(&ps[j]));

    // Holm: non-decreasing by ascending original p
    let holm = adjust_p_values(&ps, CorrectionMethod::HolmBonferroni, 0.05).unwrap();
    let holm_sorted: Vec<f64> = order.iter().map(|&i| holm.adjusted[i]).collect();
    assert!(holm_sorted.windows(2).all(|w| w[0] <= w[1]));

    // Benjamini-Hochberg: non-increasing by descending original p
    let bh = adjust_p_values(&ps, CorrectionMethod::BenjaminiHochberg, 0.05).unwrap();
    let bh_desc: Vec<f64> = order.iter().rev().map(|&i| bh.adjusted[i]).collect();
    assert!(bh_desc.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn mean_interval_fixture() {
    let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
    let at_95 = confidence_interval_mean(&sample, 0.95).unwrap();
    assert_eq!(at_95.mean, 3.0);

    let margins: Vec<f64> = [0.99, 0.95, 0.90]
        .iter()
        .map(|&c| confidence_interval_mean(&sample, c).unwrap().margin)
        .collect();
    assert!(
        margins[0] > margins[1] && margins[1] > margins[2],
        "margins not strictly decreasing: {margins:?}"
    );
}

#[test]
fn two_by_two_chi_square_has_one_degree_of_freedom() {
    let table = ContingencyTable::from_rows(&[&[10.0, 20.0], &[30.0, 40.0]]).unwrap();
    let result = chi_square_independence(&table, 0.05).unwrap();
    assert_eq!(result.degrees_of_freedom, 1);
}

#[test]
fn halving_the_effect_quadruples_the_sample() {
    let fine = sample_size_for_proportion_test(0.1, 0.05, 0.8).unwrap();
    let coarse = sample_size_for_proportion_test(0.2, 0.05, 0.8).unwrap();
    assert!(fine.sample_size > coarse.sample_size);
    assert!((fine.exact / coarse.exact - 4.0).abs() < 1e-9);
}

#[test]
fn equal_risks_mean_no_effect() {
    let result = number_needed_to_treat(0.25, 0.25, 300, 300, 0.95).unwrap();
    assert_eq!(result.absolute_risk_reduction, 0.0);
    assert!(result.nnt.is_infinite() && result.nnt > 0.0);
    assert_eq!(result.interpretation, TreatmentEffect::NoEffect);
}

#[test]
fn bonferroni_alpha_is_exact_division() {
    for n in [1, 2, 5, 17, 100] {
        let result = adjust_alpha(0.05, n, AlphaAdjustment::Bonferroni).unwrap();
        assert_eq!(result.adjusted_alpha, 0.05 / n as f64);
    }
}

#[test]
fn obrien_fleming_boundaries_decrease_and_spend_exactly() {
    for k in [2, 3, 5, 8] {
        let set = stopping_boundaries(k, 0.05, BoundaryMethod::OBrienFleming, None).unwrap();
        let boundaries: Vec<f64> = set.iter().map(|l| l.z_boundary).collect();
        assert!(
            boundaries.windows(2).all(|w| w[0] > w[1]),
            "k={k}: boundaries not strictly decreasing"
        );
        let final_alpha = set.looks().last().unwrap().cumulative_alpha;
        assert!(
            (final_alpha - 0.05).abs() < 1e-9,
            "k={k}: final cumulative alpha {final_alpha}"
        );
    }
}
