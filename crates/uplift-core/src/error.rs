//! Error types for the analysis engine.

use core::fmt;

/// Error returned when an analysis procedure rejects its inputs.
///
/// Every public procedure validates its arguments before computing anything,
/// so a returned error means no partial work was done. There are exactly two
/// failure kinds: arguments that are malformed or mutually inconsistent, and
/// samples too small for the requested procedure. Advisory conditions (e.g.
/// expected cell counts below the rule-of-thumb threshold) are reported as
/// warnings, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// An argument was malformed, out of range, or inconsistent with another.
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The violated constraint.
        reason: String,
    },

    /// The sample is too small for the requested procedure.
    InsufficientData {
        /// Minimum the procedure requires.
        needed: usize,
        /// What the caller supplied.
        actual: usize,
        /// The quantity the requirement applies to.
        context: &'static str,
    },
}

impl AnalysisError {
    /// Shorthand for an [`AnalysisError::InvalidParameter`].
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`AnalysisError::InsufficientData`].
    pub(crate) fn insufficient(needed: usize, actual: usize, context: &'static str) -> Self {
        Self::InsufficientData {
            needed,
            actual,
            context,
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            Self::InsufficientData {
                needed,
                actual,
                context,
            } => {
                write!(
                    f,
                    "insufficient data for {context}: need at least {needed}, got {actual}"
                )
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Result type for analysis procedures.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
