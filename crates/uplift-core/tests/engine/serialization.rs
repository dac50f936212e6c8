//! Result records are plain serializable values; callers log and
//! persist them as JSON.

use uplift_core::correction::{adjust_p_values, CorrectionMethod, CorrectionResult};
use uplift_core::descriptive::{describe, DescriptiveSummary};
use uplift_core::hypothesis::{
    fisher_exact_test, z_test_proportion, Alternative, FisherExactResult, ZTestComparison,
    ZTestResult,
};
use uplift_core::intervals::{confidence_interval_proportion, ProportionMethod};
use uplift_core::sequential::{stopping_boundaries, BoundaryMethod, BoundarySet};
use uplift_core::ContingencyTable;

#[test]
fn z_test_result_roundtrips() {
    let result = z_test_proportion(
        60,
        100,
        ZTestComparison::Value(0.5),
        Alternative::TwoSided,
        0.05,
    )
    .unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let back: ZTestResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);
}

#[test]
fn boundary_set_roundtrips() {
    let set = stopping_boundaries(5, 0.05, BoundaryMethod::OBrienFleming, None).unwrap();
    let json = serde_json::to_string(&set).unwrap();
    let back: BoundarySet = serde_json::from_str(&json).unwrap();
    assert_eq!(set, back);
    // Reloaded sequences still satisfy the invariants
    back.validate().unwrap();
}

#[test]
fn correction_result_roundtrips() {
    let result = adjust_p_values(
        &[0.01, 0.2, 0.04],
        CorrectionMethod::BenjaminiHochberg,
        0.05,
    )
    .unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let back: CorrectionResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);
}

#[test]
fn summary_and_fisher_serialize_with_named_fields() {
    let summary = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"median\""));
    let back: DescriptiveSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(summary, back);

    let table = ContingencyTable::from_counts(8, 2, 1, 5);
    let fisher = fisher_exact_test(&table, Alternative::TwoSided, 0.05).unwrap();
    let json = serde_json::to_string(&fisher).unwrap();
    assert!(json.contains("\"p_value\""));
    let back: FisherExactResult = serde_json::from_str(&json).unwrap();
    assert_eq!(fisher, back);
}

#[test]
fn method_enums_serialize_as_tags() {
    let interval = confidence_interval_proportion(10, 50, 0.95, ProportionMethod::Wilson).unwrap();
    let json = serde_json::to_string(&interval).unwrap();
    assert!(json.contains("Wilson"), "method tag missing from {json}");
}
