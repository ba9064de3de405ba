//! Deviation sums shared by the trend fit and the correlation analyzer.

/// Means and sums of squared/cross deviations for paired samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub n: usize,
    pub x_mean: f64,
    pub y_mean: f64,
    /// Σ(x - x̄)²
    pub sxx: f64,
    /// Σ(y - ȳ)²
    pub syy: f64,
    /// Σ(x - x̄)(y - ȳ)
    pub sxy: f64,
}

impl Moments {
    /// Two-pass computation; callers guarantee `xs.len() == ys.len() > 0`.
    pub fn compute(xs: &[f64], ys: &[f64]) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        let n = xs.len();
        let nf = n as f64;
        let x_mean = xs.iter().sum::<f64>() / nf;
        let y_mean = ys.iter().sum::<f64>() / nf;

        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for (&x, &y) in xs.iter().zip(ys) {
            let dx = x - x_mean;
            let dy = y - y_mean;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        Self {
            n,
            x_mean,
            y_mean,
            sxx,
            syy,
            sxy,
        }
    }

    /// False when any deviation sum overflowed to infinity.
    pub fn is_finite(&self) -> bool {
        self.sxx.is_finite() && self.syy.is_finite() && self.sxy.is_finite()
    }

    /// OLS slope `Sxy / Sxx`. Callers check `sxx > 0` first.
    pub fn slope(&self) -> f64 {
        self.sxy / self.sxx
    }

    /// OLS intercept `ȳ - slope·x̄`.
    pub fn intercept(&self) -> f64 {
        self.y_mean - self.slope() * self.x_mean
    }
}
