//! Analysis runner — wires dataset, config, and engine into one report.
//!
//! Trend aggregates are independent, so they fan out across the rayon pool.
//! Engine failures on one aggregate are recorded as `Skipped` entries and the
//! rest of the report still gets built.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use fiscaltrend_core::{correlate, fit, next_periods, summarize, Series};

use crate::config::{AnalysisConfig, ConfigError, CorrelationPair};
use crate::dataset::Dataset;
use crate::report::{
    AnalysisReport, CorrelationReport, Skipped, Stage, TrendReport, SCHEMA_VERSION,
};

/// Errors that stop a run before any analysis happens.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("hash config: {0}")]
    Hash(#[from] serde_json::Error),
}

/// Run every configured derivation, trend, and correlation over `dataset`.
#[tracing::instrument(
    name = "run_analysis",
    skip_all,
    fields(trends = config.trends.len(), correlations = config.correlations.len())
)]
pub fn run_analysis(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let config_hash = config.config_hash()?;

    let (dataset, derive_failures) = dataset.with_derived(&config.derived);
    let mut skipped: Vec<Skipped> = derive_failures
        .into_iter()
        .map(|(name, e)| Skipped {
            name,
            stage: Stage::Derive,
            reason: e.to_string(),
        })
        .collect();

    let outcomes: Vec<(Option<TrendReport>, Vec<Skipped>)> = config
        .trends
        .par_iter()
        .map(|name| match dataset.get(name) {
            Some(series) => run_trend(name, series, config),
            None => (None, vec![missing(name, Stage::Trend)]),
        })
        .collect();

    let mut trends = Vec::with_capacity(outcomes.len());
    for (report, skips) in outcomes {
        trends.extend(report);
        skipped.extend(skips);
    }

    let mut correlations = Vec::with_capacity(config.correlations.len());
    for pair in &config.correlations {
        match run_correlation(&dataset, pair) {
            Ok(report) => correlations.push(report),
            Err(skip) => skipped.push(skip),
        }
    }

    for s in &skipped {
        warn!(name = %s.name, stage = ?s.stage, reason = %s.reason, "skipped");
    }
    info!(
        trends = trends.len(),
        correlations = correlations.len(),
        skipped = skipped.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        config_hash,
        trends,
        correlations,
        skipped,
    })
}

/// Fit, project, and summarize one aggregate.
pub fn run_trend(
    name: &str,
    series: &Series,
    config: &AnalysisConfig,
) -> (Option<TrendReport>, Vec<Skipped>) {
    let fitted = match fit(series) {
        Ok(f) => f,
        Err(e) => return (None, vec![skip(name, Stage::Trend, e)]),
    };
    let horizon = match next_periods(fitted.last_period, config.horizon) {
        Ok(periods) => periods,
        Err(e) => return (None, vec![skip(name, Stage::Trend, e)]),
    };
    let forecast = match fitted.forecast(&horizon) {
        Ok(f) => f,
        Err(e) => return (None, vec![skip(name, Stage::Trend, e)]),
    };

    let mut skipped = Vec::new();
    let growth = match summarize(series, config.include_yoy) {
        Ok(g) => Some(g),
        Err(e) => {
            skipped.push(skip(name, Stage::Growth, e));
            None
        }
    };

    let report = TrendReport {
        name: name.to_string(),
        fit: fitted,
        forecast,
        growth,
    };
    (Some(report), skipped)
}

fn run_correlation(dataset: &Dataset, pair: &CorrelationPair) -> Result<CorrelationReport, Skipped> {
    let label = format!("{}~{}", pair.response, pair.predictor);
    let predictor = dataset
        .get(&pair.predictor)
        .ok_or_else(|| missing_input(&label, &pair.predictor))?;
    let response = dataset
        .get(&pair.response)
        .ok_or_else(|| missing_input(&label, &pair.response))?;
    let result = correlate(predictor, response).map_err(|e| skip(&label, Stage::Correlation, e))?;
    Ok(CorrelationReport {
        predictor: pair.predictor.clone(),
        response: pair.response.clone(),
        result,
    })
}

fn skip(name: &str, stage: Stage, reason: impl ToString) -> Skipped {
    Skipped {
        name: name.to_string(),
        stage,
        reason: reason.to_string(),
    }
}

fn missing(name: &str, stage: Stage) -> Skipped {
    skip(name, stage, "series not in dataset")
}

fn missing_input(label: &str, input: &str) -> Skipped {
    skip(label, Stage::Correlation, format!("series '{input}' not in dataset"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let mut ds = Dataset::new();
        let years = 2019..=2024;
        let rows = |vals: [f64; 6]| years.clone().zip(vals).collect::<Vec<_>>();
        ds.insert_rows("revenue", &rows([13200.0, 13000.0, 13800.0, 15100.0, 16325.0, 18202.0]))
            .unwrap();
        ds.insert_rows("expenses", &rows([12800.0, 13100.0, 13500.0, 14200.0, 15075.0, 16186.0]))
            .unwrap();
        ds
    }

    #[test]
    fn trend_report_has_horizon_points() {
        let config = AnalysisConfig {
            horizon: 4,
            trends: vec!["revenue".into()],
            ..AnalysisConfig::default()
        };
        let (report, skipped) = run_trend("revenue", dataset().get("revenue").unwrap(), &config);
        let report = report.unwrap();
        assert!(skipped.is_empty());
        assert_eq!(report.forecast.periods(), vec![2025, 2026, 2027, 2028]);
        assert_eq!(report.growth.unwrap().yoy.unwrap().len(), 5);
    }

    #[test]
    fn degenerate_trend_is_skipped() {
        let flat = Series::new(vec![2022, 2023, 2024], vec![5.0, 5.0, 5.0]).unwrap();
        let (report, skipped) = run_trend("flat", &flat, &AnalysisConfig::default());
        assert!(report.is_none());
        assert_eq!(skipped[0].stage, Stage::Trend);
    }

    #[test]
    fn undefined_growth_keeps_the_fit() {
        let s = Series::new(vec![2022, 2023, 2024], vec![-10.0, 5.0, 20.0]).unwrap();
        let (report, skipped) = run_trend("surplus", &s, &AnalysisConfig::default());
        let report = report.unwrap();
        assert!(report.growth.is_none());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].stage, Stage::Growth);
    }

    #[test]
    fn invalid_config_stops_the_run() {
        let config = AnalysisConfig {
            horizon: 0,
            trends: vec!["revenue".into()],
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            run_analysis(&dataset(), &config),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn unrepresentable_horizon_is_skipped_not_truncated() {
        let config = AnalysisConfig {
            horizon: 3_000_000_000,
            trends: vec!["revenue".into()],
            ..AnalysisConfig::default()
        };
        let (report, skipped) = run_trend("revenue", dataset().get("revenue").unwrap(), &config);
        assert!(report.is_none());
        assert_eq!(skipped[0].stage, Stage::Trend);
        assert!(matches!(
            run_analysis(&dataset(), &config),
            Err(RunError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn derived_name_collision_keeps_raw_series() {
        let config = AnalysisConfig::from_toml(
            r#"
trends = ["revenue"]

[[derived]]
name = "revenue"
kind = "DIFFERENCE"
left = "revenue"
right = "expenses"
"#,
        )
        .unwrap();
        let report = run_analysis(&dataset(), &config).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].stage, Stage::Derive);
        assert_eq!(report.skipped[0].name, "revenue");
        let raw = fit(dataset().get("revenue").unwrap()).unwrap();
        assert_eq!(report.trend("revenue").unwrap().fit, raw);
    }

    #[test]
    fn correlation_with_missing_input() {
        let pair = CorrelationPair {
            predictor: "revenue".into(),
            response: "net_debt".into(),
        };
        let skip = run_correlation(&dataset(), &pair).unwrap_err();
        assert_eq!(skip.stage, Stage::Correlation);
        assert!(skip.reason.contains("net_debt"));
    }
}
