//! Growth metrics — compound annual growth and simple percentage changes.
//!
//! Rates are fractions (0.05 = 5%) except [`budget_variance`], which reports
//! percent to match how budget variance is quoted in the statements.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::series::Series;

/// One year-over-year step, keyed by the later period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum YoyStep {
    /// `(v_i - v_{i-1}) / v_{i-1}`
    Change { period: i32, rate: f64 },
    /// Prior value was zero; `index` is the pair's position in the YoY sequence.
    Undefined { period: i32, index: usize },
}

impl YoyStep {
    pub fn period(&self) -> i32 {
        match *self {
            YoyStep::Change { period, .. } | YoyStep::Undefined { period, .. } => period,
        }
    }

    pub fn rate(&self) -> Option<f64> {
        match *self {
            YoyStep::Change { rate, .. } => Some(rate),
            YoyStep::Undefined { .. } => None,
        }
    }
}

/// CAGR over the full span, plus optional YoY steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    pub cagr: f64,
    pub periods_spanned: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yoy: Option<Vec<YoyStep>>,
}

/// Relative change `(current - prior) / prior`.
pub fn percent_change(prior: f64, current: f64) -> Result<f64> {
    if prior == 0.0 {
        return Err(EngineError::growth(None, "prior value is zero"));
    }
    Ok((current - prior) / prior)
}

/// Compound growth rate `(v_n / v_0)^(1/n) - 1`, n = last period - first period.
///
/// Fails with `InvalidGrowthInput` if the first value is not positive or the
/// span is zero.
pub fn cagr(series: &Series) -> Result<f64> {
    let (_, v0) = series.first();
    let (_, vn) = series.last();
    if v0 <= 0.0 {
        return Err(EngineError::growth(
            None,
            format!("base value {v0} is not positive"),
        ));
    }
    let span = series.span();
    if span == 0 {
        return Err(EngineError::growth(None, "series spans zero periods"));
    }
    // A negative end value gives a negative ratio whose fractional root is NaN.
    let ratio = vn / v0;
    if ratio < 0.0 {
        return Err(EngineError::growth(
            None,
            format!("end value {vn} has the opposite sign of the base"),
        ));
    }
    Ok(ratio.powf(1.0 / span as f64) - 1.0)
}

/// Year-over-year changes for each adjacent pair, length `len - 1`.
///
/// A pair whose prior value is zero fails on its own with
/// `InvalidGrowthInput { index: Some(i) }`; the other pairs are unaffected.
pub fn yoy_changes(series: &Series) -> Vec<Result<f64>> {
    series
        .values()
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            percent_change(w[0], w[1]).map_err(|_| {
                EngineError::growth(
                    Some(i),
                    format!("prior value for period {} is zero", series.periods()[i]),
                )
            })
        })
        .collect()
}

/// Compute the [`GrowthResult`] for `series`.
pub fn summarize(series: &Series, include_yoy: bool) -> Result<GrowthResult> {
    let cagr = cagr(series)?;
    let yoy = include_yoy.then(|| {
        yoy_changes(series)
            .into_iter()
            .enumerate()
            .map(|(i, change)| {
                let period = series.periods()[i + 1];
                match change {
                    Ok(rate) => YoyStep::Change { period, rate },
                    Err(_) => YoyStep::Undefined { period, index: i },
                }
            })
            .collect()
    });
    Ok(GrowthResult {
        cagr,
        periods_spanned: series.span(),
        yoy,
    })
}

/// Actual vs budget as a percentage, `(actual - budget) / budget * 100`.
pub fn budget_variance(actual: f64, budget: f64) -> Result<f64> {
    if budget == 0.0 {
        return Err(EngineError::growth(None, "budget is zero"));
    }
    Ok((actual - budget) / budget * 100.0)
}
