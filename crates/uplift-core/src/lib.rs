//! Statistical analysis engine for marketing experiments.
//!
//! This crate is the computation core behind A/B-test and campaign
//! evaluation: hypothesis tests, confidence intervals, effect sizes,
//! power and sample-size analysis, multiple-comparison correction, and
//! group-sequential monitoring with early stopping. Callers supply
//! summary statistics (counts, proportions, samples) and get back
//! serializable result records; the engine never touches files, the
//! network, or state across calls.
//!
//! # Components
//!
//! - [`validation`] — input-contract checks used by everything else
//! - [`descriptive`] — mean/deviation, median/IQR, summary bundle
//! - [`hypothesis`] — chi-square, Fisher exact, proportion z-tests
//! - [`intervals`] — mean, proportion (4 methods), and difference intervals
//! - [`effect`] — Cohen's d, odds ratio, relative risk, NNT
//! - [`power`] — sample size, detectable effect, power, error rates
//! - [`correction`] — five p-value adjustments plus alpha adjustment
//! - [`sequential`] — stopping boundaries, alpha spending, interim looks,
//!   conditional power, futility, optional-stopping correction
//! - [`selection`] — likelihood-ratio test and information criteria
//!
//! # Example
//!
//! ```
//! use uplift_core::hypothesis::{z_test_proportion, Alternative, ZTestComparison};
//!
//! // Variant A converted 120/1000, variant B 158/1000
//! let result = z_test_proportion(
//!     120,
//!     1000,
//!     ZTestComparison::Sample { count: 158, nobs: 1000 },
//!     Alternative::TwoSided,
//!     0.05,
//! )
//! .unwrap();
//!
//! assert!(result.is_significant);
//! assert!(result.statistic < 0.0);
//! ```
//!
//! # Concurrency
//!
//! Every procedure is a bounded, synchronous computation over its
//! arguments. The only shared value is the immutable default
//! significance level in [`AnalysisContext`]; sequential workflows carry
//! their own state ([`sequential::BoundarySet`], z-score history) across
//! calls.

pub mod constants;
pub mod context;
pub mod correction;
pub mod descriptive;
pub mod dist;
pub mod effect;
pub mod error;
pub mod hypothesis;
pub mod intervals;
pub mod power;
pub mod selection;
pub mod sequential;
pub mod table;
pub mod validation;

// Re-export the types that make up the everyday API surface
pub use context::AnalysisContext;
pub use correction::{AlphaAdjustment, CorrectionMethod, CorrectionResult};
pub use descriptive::DescriptiveSummary;
pub use effect::{EffectMagnitude, TreatmentEffect};
pub use error::{AnalysisError, AnalysisResult};
pub use hypothesis::{Alternative, ZTestComparison};
pub use intervals::{DiffMethod, ProportionMethod};
pub use sequential::{BoundaryMethod, BoundarySet, OptionalStoppingMethod};
pub use table::ContingencyTable;
