//! Forecast projection — extrapolate a trend fit with prediction bands.
//!
//! Bands use the normal critical value z = 1.96, not a Student's t quantile on
//! n - 2 degrees of freedom. For six-year histories a t-interval would be
//! roughly 40% wider.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::regression::FitResult;

/// Two-sided 95% normal critical value.
pub const Z_95: f64 = 1.96;

/// Confidence level matching [`Z_95`].
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// One projected period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: i32,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    /// Distance from the estimate to either bound.
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }
}

/// Projected points in caller order plus the band parameters used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    pub confidence_level: f64,
    pub z: f64,
}

impl ForecastResult {
    pub fn periods(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.period).collect()
    }

    pub fn estimates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.estimate).collect()
    }
}

/// Project `fit` to each of `future_periods`.
///
/// Point estimate is `slope·p + intercept`; the band half-width is
/// `z·se·sqrt(1 + 1/n + (p - x̄)²/Sxx)`. Every period must lie strictly after
/// `fit.last_period` (`InvalidHorizon`). A non-positive `sxx` or non-finite
/// `x_bar` (`DegenerateFit`) and `n == 0` (`InsufficientData`) can only come
/// from a hand-built fit.
/// Duplicates are kept and computed independently.
pub fn project(
    fit: &FitResult,
    x_bar: f64,
    sxx: f64,
    n: usize,
    future_periods: &[i32],
) -> Result<ForecastResult> {
    if sxx.is_nan() || sxx <= 0.0 {
        return Err(EngineError::degenerate(
            "prediction interval",
            format!("period sum of squares {sxx} is not positive"),
        ));
    }
    if !x_bar.is_finite() {
        return Err(EngineError::degenerate(
            "prediction interval",
            format!("mean period {x_bar} is not finite"),
        ));
    }
    if n == 0 {
        return Err(EngineError::InsufficientData {
            required: 2,
            actual: 0,
        });
    }
    if let Some(&period) = future_periods.iter().find(|&&p| p <= fit.last_period) {
        return Err(EngineError::InvalidHorizon {
            period,
            last_observed: fit.last_period,
        });
    }

    let inv_n = 1.0 / n as f64;
    let points = future_periods
        .iter()
        .map(|&period| {
            let x = period as f64;
            let estimate = fit.predict(x);
            let dx = x - x_bar;
            let half = Z_95 * fit.std_error * (1.0 + inv_n + dx * dx / sxx).sqrt();
            ForecastPoint {
                period,
                estimate,
                lower: estimate - half,
                upper: estimate + half,
            }
        })
        .collect::<Vec<_>>();

    debug!(count = points.len(), "projected forecast");

    Ok(ForecastResult {
        points,
        confidence_level: CONFIDENCE_LEVEL,
        z: Z_95,
    })
}

/// The `count` periods immediately after `last_period`.
///
/// Fails with `Validation` when the last of them would not fit in an `i32`.
pub fn next_periods(last_period: i32, count: u32) -> Result<Vec<i32>> {
    let out_of_range = || {
        EngineError::Validation(format!(
            "{count} periods after {last_period} exceed the period range"
        ))
    };
    let steps = i32::try_from(count).map_err(|_| out_of_range())?;
    last_period.checked_add(steps).ok_or_else(out_of_range)?;
    Ok((1..=steps).map(|k| last_period + k).collect())
}
