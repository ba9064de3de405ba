//! Dataset — the named aggregates one analysis run works over.

use std::collections::BTreeMap;

use fiscaltrend_core::{EngineError, Series};
use thiserror::Error;
use tracing::debug;

use crate::config::{DerivedKind, DerivedSeries};

/// Named series keyed by aggregate name ("revenue", "net_debt", ...).
///
/// Units must already agree across series; nothing here rescales.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    series: BTreeMap<String, Series>,
}

/// Why a derived series could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeriveFailure {
    #[error("input series '{0}' not in dataset")]
    MissingInput(String),
    #[error("name '{0}' is already taken by a series in the dataset")]
    NameTaken(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a series. Returns the series it replaced, if any.
    pub fn insert(&mut self, name: impl Into<String>, series: Series) -> Option<Series> {
        self.series.insert(name.into(), series)
    }

    /// Validate and add raw `(period, value)` rows from an input provider.
    pub fn insert_rows(
        &mut self,
        name: impl Into<String>,
        rows: &[(i32, f64)],
    ) -> Result<(), EngineError> {
        let series = Series::from_pairs(rows)?;
        self.series.insert(name.into(), series);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// Aggregate names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.series.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Build one derived series from inputs already in the dataset.
    pub fn derive(&self, spec: &DerivedSeries) -> Result<Series, DeriveFailure> {
        let left = self
            .get(&spec.left)
            .ok_or_else(|| DeriveFailure::MissingInput(spec.left.clone()))?;
        let right = self
            .get(&spec.right)
            .ok_or_else(|| DeriveFailure::MissingInput(spec.right.clone()))?;
        let out = match spec.kind {
            DerivedKind::Difference => left.difference(right)?,
            DerivedKind::RatioPct => left.ratio_pct(right)?,
        };
        Ok(out)
    }

    /// Copy of this dataset with each derived series added in order.
    ///
    /// Later entries may use earlier ones as inputs. Entries that cannot be
    /// built are returned alongside rather than aborting the rest. An entry
    /// never replaces a series already in the dataset.
    pub fn with_derived(&self, specs: &[DerivedSeries]) -> (Dataset, Vec<(String, DeriveFailure)>) {
        let mut out = self.clone();
        let mut failures = Vec::new();
        for spec in specs {
            if out.contains(&spec.name) {
                failures.push((spec.name.clone(), DeriveFailure::NameTaken(spec.name.clone())));
                continue;
            }
            match out.derive(spec) {
                Ok(series) => {
                    debug!(name = %spec.name, kind = ?spec.kind, "derived series");
                    out.insert(spec.name.clone(), series);
                }
                Err(e) => failures.push((spec.name.clone(), e)),
            }
        }
        (out, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.insert_rows("revenue", &[(2022, 100.0), (2023, 120.0), (2024, 150.0)])
            .unwrap();
        ds.insert_rows("expenses", &[(2022, 90.0), (2023, 100.0), (2024, 110.0)])
            .unwrap();
        ds
    }

    fn spec(name: &str, kind: DerivedKind, left: &str, right: &str) -> DerivedSeries {
        DerivedSeries {
            name: name.into(),
            kind,
            left: left.into(),
            right: right.into(),
        }
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(sample().names(), vec!["expenses", "revenue"]);
        assert_eq!(sample().len(), 2);
    }

    #[test]
    fn insert_rows_validates() {
        let mut ds = Dataset::new();
        assert!(ds.insert_rows("bad", &[(2024, 1.0), (2023, 2.0)]).is_err());
        assert!(ds.is_empty());
    }

    #[test]
    fn derives_surplus() {
        let (ds, failures) =
            sample().with_derived(&[spec("surplus", DerivedKind::Difference, "revenue", "expenses")]);
        assert!(failures.is_empty());
        assert_eq!(ds.get("surplus").unwrap().values(), &[10.0, 20.0, 40.0]);
    }

    #[test]
    fn derived_can_chain() {
        let (ds, failures) = sample().with_derived(&[
            spec("surplus", DerivedKind::Difference, "revenue", "expenses"),
            spec("margin", DerivedKind::RatioPct, "surplus", "revenue"),
        ]);
        assert!(failures.is_empty());
        assert!((ds.get("margin").unwrap().at(2022).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn missing_input_is_reported_not_fatal() {
        let (ds, failures) = sample().with_derived(&[
            spec("x", DerivedKind::Difference, "revenue", "capital_assets"),
            spec("surplus", DerivedKind::Difference, "revenue", "expenses"),
        ]);
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].1,
            DeriveFailure::MissingInput("capital_assets".into())
        );
        assert!(ds.contains("surplus"));
        assert!(!ds.contains("x"));
    }

    #[test]
    fn derived_never_replaces_an_input() {
        let (ds, failures) =
            sample().with_derived(&[spec("revenue", DerivedKind::Difference, "revenue", "expenses")]);
        assert_eq!(
            failures,
            vec![("revenue".to_string(), DeriveFailure::NameTaken("revenue".into()))]
        );
        assert_eq!(ds.get("revenue").unwrap().values(), &[100.0, 120.0, 150.0]);
    }
}
