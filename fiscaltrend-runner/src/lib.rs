//! FiscalTrend Runner — batch analysis over a municipality's named aggregates.
//!
//! This crate builds on `fiscaltrend-core` to provide:
//! - TOML analysis configuration with a reproducibility hash
//! - A named `Dataset` with derived series (surplus, debt-to-revenue)
//! - Parallel trend runs and configured correlations
//! - Serializable reports for the chart renderer

pub mod config;
pub mod dataset;
pub mod report;
pub mod runner;

pub use config::{
    AnalysisConfig, ConfigError, CorrelationPair, DerivedKind, DerivedSeries, MAX_HORIZON,
};
pub use dataset::{Dataset, DeriveFailure};
pub use report::{AnalysisReport, CorrelationReport, Skipped, Stage, TrendReport, SCHEMA_VERSION};
pub use runner::{run_analysis, run_trend, RunError};
