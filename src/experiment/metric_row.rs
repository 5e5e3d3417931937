//! Metric Row - one named series from one run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ExperimentKey;

/// Metric Row represents one named measurement series (e.g. `pg_ape_se3`)
/// from a single run, with its summary statistics.
///
/// ## Missing values
///
/// A metric column that exists in the source file but has an empty cell
/// is stored as `None`, distinct from a metric that the file does not
/// carry at all (absent key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    name: String,
    key: ExperimentKey,
    metrics: BTreeMap<String, Option<f64>>,
}

impl MetricRow {
    /// Create a row with no metric values.
    #[must_use]
    pub fn new(name: impl Into<String>, key: ExperimentKey) -> Self {
        Self {
            name: name.into(),
            key,
            metrics: BTreeMap::new(),
        }
    }

    /// Create a builder for a row with metric values.
    #[must_use]
    pub fn builder(name: impl Into<String>, key: ExperimentKey) -> MetricRowBuilder {
        MetricRowBuilder::new(name, key)
    }

    /// Identifying value of the row (the series name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the row came from.
    #[must_use]
    pub const fn key(&self) -> ExperimentKey {
        self.key
    }

    /// Canonical run label, `"<iters>_<history>"`.
    #[must_use]
    pub fn exp_label(&self) -> String {
        self.key.label()
    }

    /// Whether the row carries a column for `metric` (filled or not).
    #[must_use]
    pub fn has_metric(&self, metric: &str) -> bool {
        self.metrics.contains_key(metric)
    }

    /// Value of `metric`, `None` if absent or empty.
    #[must_use]
    pub fn metric(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied().flatten()
    }

    /// Metric column names, sorted.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Set (or clear) one metric value.
    pub fn set_metric(&mut self, metric: impl Into<String>, value: Option<f64>) {
        self.metrics.insert(metric.into(), value);
    }
}

/// Builder for `MetricRow`.
#[derive(Debug)]
pub struct MetricRowBuilder {
    row: MetricRow,
}

impl MetricRowBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, key: ExperimentKey) -> Self {
        Self {
            row: MetricRow::new(name, key),
        }
    }

    /// Add a filled metric value.
    #[must_use]
    pub fn metric(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.row.set_metric(metric, Some(value));
        self
    }

    /// Add a metric column with an empty cell.
    #[must_use]
    pub fn missing(mut self, metric: impl Into<String>) -> Self {
        self.row.set_metric(metric, None);
        self
    }

    /// Build the `MetricRow`.
    #[must_use]
    pub fn build(self) -> MetricRow {
        self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_row_builder() {
        let row = MetricRow::builder("pg_ape_se3", ExperimentKey::new(33, 10))
            .metric("rmse", 0.5)
            .missing("sse")
            .build();

        assert_eq!(row.name(), "pg_ape_se3");
        assert_eq!(row.exp_label(), "33_10");
        assert!((row.metric("rmse").unwrap() - 0.5).abs() < f64::EPSILON);
        assert!(row.has_metric("sse"));
        assert_eq!(row.metric("sse"), None);
        assert!(!row.has_metric("max"));
        assert_eq!(row.metric_names().collect::<Vec<_>>(), vec!["rmse", "sse"]);
    }
}
