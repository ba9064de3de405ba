//! Report value objects handed to the chart renderer.

use serde::{Deserialize, Serialize};

use fiscaltrend_core::{CorrelationResult, FitResult, ForecastResult, GrowthResult};

/// Current schema version for serialized reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Trend fit, projection, and growth for one aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub name: String,
    pub fit: FitResult,
    pub forecast: ForecastResult,
    /// None when growth is undefined for this series; the reason is in
    /// `AnalysisReport::skipped`.
    pub growth: Option<GrowthResult>,
}

/// One configured correlation pair and its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub predictor: String,
    pub response: String,
    pub result: CorrelationResult,
}

/// Which part of the run gave up on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Derive,
    Trend,
    Growth,
    Correlation,
}

/// An item the run could not produce, with the engine's reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skipped {
    pub name: String,
    pub stage: Stage,
    pub reason: String,
}

/// Complete output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_hash: String,
    pub trends: Vec<TrendReport>,
    pub correlations: Vec<CorrelationReport>,
    pub skipped: Vec<Skipped>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AnalysisReport {
    pub fn trend(&self, name: &str) -> Option<&TrendReport> {
        self.trends.iter().find(|t| t.name == name)
    }

    pub fn correlation(&self, predictor: &str, response: &str) -> Option<&CorrelationReport> {
        self.correlations
            .iter()
            .find(|c| c.predictor == predictor && c.response == response)
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
