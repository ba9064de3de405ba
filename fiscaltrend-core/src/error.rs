//! Engine error taxonomy.
//!
//! Every undefined statistic surfaces as one of these variants. Nothing in the
//! engine substitutes zero or NaN for a value it could not compute.

use thiserror::Error;

/// Errors returned by every engine operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed series construction or a pointwise operation that cannot be
    /// applied to the given values.
    #[error("invalid series: {0}")]
    Validation(String),

    /// Exact period lookup found nothing.
    #[error("no value recorded for period {period}")]
    Lookup { period: i32 },

    /// Too few observations for the requested statistic.
    #[error("need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A zero-variance input made the named statistic undefined.
    #[error("{statistic} is undefined: {reason}")]
    DegenerateFit {
        statistic: &'static str,
        reason: String,
    },

    /// Forecast requested at or before the last observed period.
    #[error("forecast period {period} is not after the last observed period {last_observed}")]
    InvalidHorizon { period: i32, last_observed: i32 },

    /// Two series whose periods are not pointwise aligned.
    #[error("series periods are not aligned: {0}")]
    SeriesMismatch(String),

    /// Growth rate undefined for the given base or span. `index` names the
    /// failing year-over-year pair when the failure is per-pair.
    #[error("growth rate undefined{}: {reason}", pair_suffix(.index))]
    InvalidGrowthInput {
        index: Option<usize>,
        reason: String,
    },
}

fn pair_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" at pair {i}")).unwrap_or_default()
}

/// Short alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn degenerate(statistic: &'static str, reason: impl Into<String>) -> Self {
        EngineError::DegenerateFit {
            statistic,
            reason: reason.into(),
        }
    }

    pub(crate) fn growth(index: Option<usize>, reason: impl Into<String>) -> Self {
        EngineError::InvalidGrowthInput {
            index,
            reason: reason.into(),
        }
    }
}
