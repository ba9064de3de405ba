//! Trend fit — ordinary least squares of a series' values on its periods.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::forecast::{self, ForecastResult};
use crate::moments::Moments;
use crate::series::Series;

/// Fitted trend line plus the sample statistics a prediction band needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Value units per period.
    pub slope: f64,
    pub intercept: f64,
    /// `1 - SSres/SStot`. Not clamped; negative means worse than the mean.
    pub r_squared: f64,
    /// Standard error of the estimate, `sqrt(SSres / (n - 2))`. Zero for n = 2.
    pub std_error: f64,
    /// Mean observed period.
    pub x_mean: f64,
    /// Σ(period - x_mean)²
    pub sxx: f64,
    /// Number of observations fitted.
    pub n: usize,
    /// Last observed period; forecasts must lie strictly after it.
    pub last_period: i32,
}

/// Fit `value = slope·period + intercept` by ordinary least squares.
///
/// Fails with `InsufficientData` for fewer than two points and with
/// `DegenerateFit` when every value is identical (R² undefined) or when the
/// values are too large for the sums of squares to stay finite.
pub fn fit(series: &Series) -> Result<FitResult> {
    let n = series.len();
    if n < 2 {
        return Err(EngineError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let xs: Vec<f64> = series.periods().iter().map(|&p| p as f64).collect();
    let ys = series.values();
    let m = Moments::compute(&xs, ys);

    if !m.is_finite() {
        return Err(EngineError::degenerate(
            "R²",
            "sums of squares overflow f64",
        ));
    }
    if m.sxx == 0.0 {
        return Err(EngineError::degenerate(
            "slope",
            "all periods are identical",
        ));
    }
    if m.syy == 0.0 {
        return Err(EngineError::degenerate(
            "R²",
            "all values are identical, total sum of squares is zero",
        ));
    }

    let slope = m.slope();
    let intercept = m.intercept();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = y - (slope * x + intercept);
            r * r
        })
        .sum();

    let r_squared = 1.0 - ss_res / m.syy;
    let std_error = if n == 2 {
        0.0
    } else {
        (ss_res / (n - 2) as f64).sqrt()
    };
    if ![slope, intercept, r_squared, std_error]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(EngineError::degenerate(
            "standard error",
            "residual sum of squares overflows f64",
        ));
    }

    debug!(
        n,
        slope,
        intercept,
        r_squared,
        std_error,
        "fitted trend line"
    );

    Ok(FitResult {
        slope,
        intercept,
        r_squared,
        std_error,
        x_mean: m.x_mean,
        sxx: m.sxx,
        n,
        last_period: series.last().0,
    })
}

impl FitResult {
    /// Point on the fitted line at `period`.
    pub fn predict(&self, period: f64) -> f64 {
        self.slope * period + self.intercept
    }

    /// Fitted values at each observed period of `series`.
    pub fn fitted(&self, series: &Series) -> Vec<f64> {
        series
            .periods()
            .iter()
            .map(|&p| self.predict(p as f64))
            .collect()
    }

    /// Observed minus fitted values.
    ///
    /// Fails with `Validation` when `series` is not the length this fit saw.
    pub fn residuals(&self, series: &Series) -> Result<Vec<f64>> {
        if series.len() != self.n {
            return Err(EngineError::Validation(format!(
                "fit has {} observations, series has {}",
                self.n,
                series.len()
            )));
        }
        Ok(series
            .iter()
            .map(|(p, v)| v - self.predict(p as f64))
            .collect())
    }

    /// Project this fit to `future_periods` using its own sample statistics.
    pub fn forecast(&self, future_periods: &[i32]) -> Result<ForecastResult> {
        forecast::project(self, self.x_mean, self.sxx, self.n, future_periods)
    }
}
