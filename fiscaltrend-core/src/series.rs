//! Series — ordered fiscal-year figures for one financial aggregate.
//!
//! A `Series` is validated once at construction and never mutated afterwards.
//! Periods are strictly increasing fiscal years; values share one currency
//! scale (the engine performs no unit conversion).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Minimum number of points for any series.
pub const MIN_POINTS: usize = 2;

/// An immutable, validated `(period, value)` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries", into = "RawSeries")]
pub struct Series {
    periods: Vec<i32>,
    values: Vec<f64>,
}

/// Unvalidated wire form; deserialization goes through `Series::new`.
#[derive(Serialize, Deserialize)]
struct RawSeries {
    periods: Vec<i32>,
    values: Vec<f64>,
}

impl TryFrom<RawSeries> for Series {
    type Error = EngineError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        Series::new(raw.periods, raw.values)
    }
}

impl From<Series> for RawSeries {
    fn from(series: Series) -> Self {
        RawSeries {
            periods: series.periods,
            values: series.values,
        }
    }
}

impl Series {
    /// Build a series from parallel period and value sequences.
    ///
    /// Fails with `Validation` when the lengths differ, fewer than two points
    /// are given, periods are not strictly increasing, or a value is not finite.
    pub fn new(periods: Vec<i32>, values: Vec<f64>) -> Result<Self> {
        if periods.len() != values.len() {
            return Err(EngineError::Validation(format!(
                "{} periods but {} values",
                periods.len(),
                values.len()
            )));
        }
        if periods.len() < MIN_POINTS {
            return Err(EngineError::Validation(format!(
                "need at least {MIN_POINTS} points, got {}",
                periods.len()
            )));
        }
        if let Some(w) = periods.windows(2).find(|w| w[1] <= w[0]) {
            return Err(EngineError::Validation(format!(
                "periods must be strictly increasing: {} followed by {}",
                w[0], w[1]
            )));
        }
        if let Some((p, v)) = periods
            .iter()
            .zip(values.iter())
            .find(|(_, v)| !v.is_finite())
        {
            return Err(EngineError::Validation(format!(
                "value for period {p} is not finite ({v})"
            )));
        }
        Ok(Self { periods, values })
    }

    /// Build a series from `(period, value)` pairs in period order.
    pub fn from_pairs(pairs: &[(i32, f64)]) -> Result<Self> {
        let (periods, values) = pairs.iter().copied().unzip();
        Self::new(periods, values)
    }

    /// Value recorded for exactly `period`. No interpolation.
    pub fn at(&self, period: i32) -> Result<f64> {
        self.periods
            .binary_search(&period)
            .map(|i| self.values[i])
            .map_err(|_| EngineError::Lookup { period })
    }

    pub fn periods(&self) -> &[i32] {
        &self.periods
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always false: construction rejects series shorter than two points.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// First `(period, value)` pair.
    pub fn first(&self) -> (i32, f64) {
        (self.periods[0], self.values[0])
    }

    /// Last `(period, value)` pair.
    pub fn last(&self) -> (i32, f64) {
        let i = self.periods.len() - 1;
        (self.periods[i], self.values[i])
    }

    /// Number of periods elapsed between the first and last point.
    pub fn span(&self) -> i64 {
        i64::from(self.last().0) - i64::from(self.first().0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.periods.iter().copied().zip(self.values.iter().copied())
    }

    /// True when both series carry the same periods in the same order.
    pub fn is_aligned_with(&self, other: &Series) -> bool {
        self.periods == other.periods
    }

    /// Fail with `SeriesMismatch` unless `other` shares this series' periods.
    pub fn ensure_aligned(&self, other: &Series) -> Result<()> {
        if self.periods.len() != other.periods.len() {
            return Err(EngineError::SeriesMismatch(format!(
                "{} periods vs {} periods",
                self.periods.len(),
                other.periods.len()
            )));
        }
        if let Some((a, b)) = self
            .periods
            .iter()
            .zip(other.periods.iter())
            .find(|(a, b)| a != b)
        {
            return Err(EngineError::SeriesMismatch(format!(
                "period {a} paired with period {b}"
            )));
        }
        Ok(())
    }

    /// Pointwise combination of two aligned series.
    ///
    /// `op` receives `(period, left, right)` and may reject a pair; the result
    /// is validated like any other series.
    pub fn combine<F>(&self, other: &Series, op: F) -> Result<Series>
    where
        F: Fn(i32, f64, f64) -> Result<f64>,
    {
        self.ensure_aligned(other)?;
        let values = self
            .iter()
            .zip(other.values.iter())
            .map(|((p, l), &r)| op(p, l, r))
            .collect::<Result<Vec<f64>>>()?;
        Series::new(self.periods.clone(), values)
    }

    /// `self - other` per period (e.g. surplus = revenue - expenses).
    pub fn difference(&self, other: &Series) -> Result<Series> {
        self.combine(other, |_, l, r| Ok(l - r))
    }

    /// `self / other * 100` per period (e.g. net debt as % of revenue).
    ///
    /// A zero denominator fails with `Validation` naming the period.
    pub fn ratio_pct(&self, other: &Series) -> Result<Series> {
        self.combine(other, |p, l, r| {
            if r == 0.0 {
                Err(EngineError::Validation(format!(
                    "denominator is zero for period {p}"
                )))
            } else {
                Ok(l / r * 100.0)
            }
        })
    }
}
