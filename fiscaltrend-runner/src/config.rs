//! Serializable analysis configuration.
//!
//! Stored as TOML: which aggregates to trend, which derived series to build
//! first, which pairs to correlate, and how far to project.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating an analysis config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How a derived series combines its two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedKind {
    /// `left - right`, e.g. surplus from revenue and expenses.
    Difference,
    /// `left / right * 100`, e.g. net debt as a share of revenue.
    RatioPct,
}

/// A series computed from two named inputs before any analysis runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub name: String,
    pub kind: DerivedKind,
    pub left: String,
    pub right: String,
}

/// One aggregate regressed on another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub predictor: String,
    pub response: String,
}

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Fiscal years to project past the last observation.
    #[serde(default = "default_horizon")]
    pub horizon: u32,

    /// Attach year-over-year steps to each growth summary.
    #[serde(default = "default_include_yoy")]
    pub include_yoy: bool,

    /// Aggregates to trend, fit, project, and summarize, in report order.
    #[serde(default)]
    pub trends: Vec<String>,

    #[serde(default)]
    pub derived: Vec<DerivedSeries>,

    #[serde(default)]
    pub correlations: Vec<CorrelationPair>,
}

/// Longest projection a config may request, in periods.
pub const MAX_HORIZON: u32 = 50;

fn default_horizon() -> u32 {
    3
}

fn default_include_yoy() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            include_yoy: default_include_yoy(),
            trends: Vec::new(),
            derived: Vec::new(),
            correlations: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The statement-deck default: three-year projections of the four
    /// headline aggregates, surplus and debt burden derived, revenue vs
    /// expenses correlated.
    pub fn statement_default() -> Self {
        Self {
            trends: ["revenue", "expenses", "net_debt", "capital_assets", "surplus"]
                .into_iter()
                .map(String::from)
                .collect(),
            derived: vec![
                DerivedSeries {
                    name: "surplus".into(),
                    kind: DerivedKind::Difference,
                    left: "revenue".into(),
                    right: "expenses".into(),
                },
                DerivedSeries {
                    name: "net_debt_pct_revenue".into(),
                    kind: DerivedKind::RatioPct,
                    left: "net_debt".into(),
                    right: "revenue".into(),
                },
            ],
            correlations: vec![CorrelationPair {
                predictor: "revenue".into(),
                response: "expenses".into(),
            }],
            ..Self::default()
        }
    }

    /// Reject configs that cannot produce a meaningful report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon == 0 {
            return Err(ConfigError::Invalid("horizon must be at least 1".into()));
        }
        if self.horizon > MAX_HORIZON {
            return Err(ConfigError::Invalid(format!(
                "horizon {} exceeds the maximum of {MAX_HORIZON} periods",
                self.horizon
            )));
        }
        if self.trends.is_empty() && self.correlations.is_empty() {
            return Err(ConfigError::Invalid(
                "nothing to analyze: trends and correlations are both empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for d in &self.derived {
            if !seen.insert(d.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "derived series '{}' defined twice",
                    d.name
                )));
            }
        }
        Ok(())
    }

    /// Deterministic blake3 digest of this config's JSON form.
    ///
    /// Two runs with identical configs share a hash, which lets a renderer
    /// tell whether two reports are comparable.
    pub fn config_hash(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
