//! Session configuration for the analysis engine.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ALPHA;
use crate::error::AnalysisResult;
use crate::validation::require_probability;

/// Immutable per-session configuration.
///
/// Holds the one value every component shares: the default significance
/// level. Created once, then read concurrently without synchronization;
/// nothing in the engine mutates it and no call retains state across
/// invocations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    default_alpha: f64,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            default_alpha: DEFAULT_ALPHA,
        }
    }
}

impl AnalysisContext {
    /// Create a context with the given significance level.
    ///
    /// `alpha` must be strictly inside (0, 1).
    pub fn new(alpha: f64) -> AnalysisResult<Self> {
        require_probability("alpha", alpha)?;
        Ok(Self {
            default_alpha: alpha,
        })
    }

    /// The session's default significance level.
    pub fn default_alpha(&self) -> f64 {
        self.default_alpha
    }

    /// The complementary confidence level, `1 - alpha`.
    pub fn confidence_level(&self) -> f64 {
        1.0 - self.default_alpha
    }

    /// Whether a p-value is significant at the session level.
    pub fn is_significant(&self, p_value: f64) -> bool {
        p_value < self.default_alpha
    }
}
