//! FiscalTrend Core — trend and correlation engine for multi-year fiscal figures.
//!
//! This crate holds the numeric core and nothing else:
//! - `Series`: validated, immutable fiscal-year → value sequences
//! - `regression::fit`: OLS trend of values on fiscal year
//! - `forecast::project`: extrapolation with 95% prediction bands
//! - `correlation::correlate`: one aggregate regressed on another, Pearson r
//! - `growth`: CAGR, year-over-year changes, budget variance
//!
//! Every operation is a pure function over immutable inputs. Results are plain
//! serde value objects for whatever renders them; the engine formats nothing.

pub mod correlation;
pub mod error;
pub mod forecast;
pub mod growth;
mod moments;
pub mod regression;
pub mod series;

pub use correlation::{correlate, CorrelationResult};
pub use error::{EngineError, Result};
pub use forecast::{next_periods, project, ForecastPoint, ForecastResult, CONFIDENCE_LEVEL, Z_95};
pub use growth::{budget_variance, cagr, percent_change, summarize, yoy_changes, GrowthResult, YoyStep};
pub use regression::{fit, FitResult};
pub use series::Series;
