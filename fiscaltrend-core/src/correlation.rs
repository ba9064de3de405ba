//! Cross-series correlation — how two aggregates co-move across matched years.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::moments::Moments;
use crate::series::Series;

/// Response regressed on predictor values, with signed Pearson r.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation in [-1, 1]; sign gives the direction of co-movement.
    pub r: f64,
    pub n: usize,
}

impl CorrelationResult {
    pub fn r_squared(&self) -> f64 {
        self.r * self.r
    }

    /// Response value the fitted line predicts for `predictor_value`.
    pub fn predict(&self, predictor_value: f64) -> f64 {
        self.slope * predictor_value + self.intercept
    }
}

/// Fit `response = slope·predictor + intercept` across matched periods.
///
/// Both series must carry identical period sequences (`SeriesMismatch`).
/// Zero variance in either series leaves r undefined (`DegenerateFit`), as do
/// values large enough to overflow the sums of squares.
pub fn correlate(predictor: &Series, response: &Series) -> Result<CorrelationResult> {
    predictor.ensure_aligned(response)?;

    let m = Moments::compute(predictor.values(), response.values());
    if !m.is_finite() {
        return Err(EngineError::degenerate(
            "Pearson r",
            "sums of squares overflow f64",
        ));
    }
    if m.sxx == 0.0 {
        return Err(EngineError::degenerate(
            "Pearson r",
            "predictor series has zero variance",
        ));
    }
    if m.syy == 0.0 {
        return Err(EngineError::degenerate(
            "Pearson r",
            "response series has zero variance",
        ));
    }

    // Rounding can push |r| a hair past 1 for perfectly collinear input.
    let r = (m.sxy / (m.sxx.sqrt() * m.syy.sqrt())).clamp(-1.0, 1.0);
    let slope = m.slope();
    let intercept = m.intercept();
    if !(r.is_finite() && slope.is_finite() && intercept.is_finite()) {
        return Err(EngineError::degenerate(
            "Pearson r",
            "deviation product overflows f64",
        ));
    }

    debug!(n = m.n, r, slope, "correlated series");

    Ok(CorrelationResult {
        slope,
        intercept,
        r,
        n: m.n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(periods: Vec<i32>, values: Vec<f64>) -> Series {
        Series::new(periods, values).unwrap()
    }

    #[test]
    fn perfect_positive_line() {
        let a = s(vec![1, 2, 3], vec![1.0, 2.0, 3.0]);
        let b = s(vec![1, 2, 3], vec![10.0, 20.0, 30.0]);
        let c = correlate(&a, &b).unwrap();
        assert!((c.r - 1.0).abs() < 1e-12);
        assert!((c.slope - 10.0).abs() < 1e-12);
        assert!(c.intercept.abs() < 1e-9);
        assert_eq!(c.n, 3);
    }

    #[test]
    fn negative_correlation_keeps_sign() {
        let a = s(vec![1, 2, 3, 4], vec![1.0, 2.0, 3.0, 4.0]);
        let b = s(vec![1, 2, 3, 4], vec![8.0, 6.5, 4.0, 2.0]);
        let c = correlate(&a, &b).unwrap();
        assert!(c.r < -0.9);
        assert!(c.slope < 0.0);
        assert!(c.r_squared() > 0.8);
    }

    #[test]
    fn regresses_on_values_not_periods() {
        let a = s(vec![2020, 2021, 2022], vec![100.0, 300.0, 200.0]);
        let b = s(vec![2020, 2021, 2022], vec![10.0, 30.0, 20.0]);
        let c = correlate(&a, &b).unwrap();
        assert!((c.slope - 0.1).abs() < 1e-12);
        assert!((c.predict(250.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_periods() {
        let a = s(vec![2020, 2021], vec![1.0, 2.0]);
        let b = s(vec![2020, 2022], vec![1.0, 2.0]);
        assert!(matches!(
            correlate(&a, &b),
            Err(EngineError::SeriesMismatch(_))
        ));
    }

    #[test]
    fn mismatched_lengths() {
        let a = s(vec![2020, 2021], vec![1.0, 2.0]);
        let b = s(vec![2020, 2021, 2022], vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            correlate(&a, &b),
            Err(EngineError::SeriesMismatch(_))
        ));
    }

    #[test]
    fn zero_variance_either_side() {
        let flat = s(vec![1, 2, 3], vec![5.0, 5.0, 5.0]);
        let moving = s(vec![1, 2, 3], vec![1.0, 2.0, 4.0]);
        assert!(matches!(
            correlate(&flat, &moving),
            Err(EngineError::DegenerateFit { .. })
        ));
        assert!(matches!(
            correlate(&moving, &flat),
            Err(EngineError::DegenerateFit { .. })
        ));
    }

    #[test]
    fn overflowing_values_are_degenerate_not_nan() {
        let a = s(vec![1, 2, 3], vec![1e200, 3e200, 2e200]);
        let b = s(vec![1, 2, 3], vec![2e200, 1e200, 4e200]);
        assert!(matches!(
            correlate(&a, &b),
            Err(EngineError::DegenerateFit { statistic: "Pearson r", .. })
        ));
    }

    #[test]
    fn large_but_finite_variances_keep_r() {
        let a = s(vec![1, 2, 3], vec![1e100, 2e100, 3e100]);
        let b = s(vec![1, 2, 3], vec![3e100, 2e100, 1e100]);
        let c = correlate(&a, &b).unwrap();
        assert!((c.r + 1.0).abs() < 1e-12);
    }
}
