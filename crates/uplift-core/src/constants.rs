//! Numeric defaults and thresholds shared across the engine.

/// Default significance level for session contexts.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Minimum grand total of observations for a chi-square test.
///
/// Below this the large-sample approximation is unreliable and the test
/// refuses to run. Fisher's exact test has no such floor.
pub const CHI_SQUARE_MIN_TOTAL: f64 = 20.0;

/// Expected-cell threshold below which chi-square emits an advisory warning.
///
/// The classic rule of thumb: the approximation degrades when any expected
/// count drops under 5. This is a warning, never a failure.
pub const EXPECTED_CELL_WARNING: f64 = 5.0;

/// Default minimum sample size for [`check_sufficient_data`].
///
/// [`check_sufficient_data`]: crate::validation::check_sufficient_data
pub const DEFAULT_MIN_SAMPLES: usize = 30;

/// Haldane-Anscombe smoothing constant added to every cell of a 2x2 table
/// when a required cell is zero.
pub const HALDANE_CORRECTION: f64 = 0.5;

/// Cohen's d interpretation cut points: |d| below the first is negligible,
/// then small, medium, large.
pub const COHENS_D_CUTS: [f64; 3] = [0.2, 0.5, 0.8];
