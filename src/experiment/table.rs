//! Aggregated Table - long-form concatenation of every loaded run

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use super::{ExperimentKey, MetricRow};
use crate::Result;

/// Long-form table with columns `{name, iters, history, exp_label, <metrics>}`.
///
/// Row order carries no meaning; everything downstream groups by
/// [`ExperimentKey`] or by name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregatedTable {
    rows: Vec<MetricRow>,
}

impl AggregatedTable {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from existing rows.
    #[must_use]
    pub fn from_rows(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// Append one row.
    pub fn push(&mut self, row: MetricRow) {
        self.rows.push(row);
    }

    /// Distinct identifying values, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.name().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Union of metric column names over all rows, sorted.
    #[must_use]
    pub fn metric_columns(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(MetricRow::metric_names)
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct run keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<ExperimentKey> {
        self.rows
            .iter()
            .map(MetricRow::key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Export as an Arrow `RecordBatch` in long form.
    ///
    /// Metric columns a row does not carry are null in that row.
    ///
    /// # Errors
    ///
    /// Returns error if the batch cannot be assembled
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let metrics = self.metric_columns();

        let mut fields = vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("iters", DataType::UInt64, false),
            Field::new("history", DataType::UInt64, false),
            Field::new("exp_label", DataType::Utf8, false),
        ];
        fields.extend(
            metrics
                .iter()
                .map(|metric| Field::new(metric.as_str(), DataType::Float64, true)),
        );

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(self.rows.iter().map(MetricRow::name))),
            Arc::new(UInt64Array::from_iter_values(
                self.rows.iter().map(|row| row.key().iters()),
            )),
            Arc::new(UInt64Array::from_iter_values(
                self.rows.iter().map(|row| row.key().history()),
            )),
            Arc::new(StringArray::from_iter_values(
                self.rows.iter().map(MetricRow::exp_label),
            )),
        ];
        for metric in &metrics {
            let values: Float64Array = self.rows.iter().map(|row| row.metric(metric)).collect();
            columns.push(Arc::new(values));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }
}

impl Extend<MetricRow> for AggregatedTable {
    fn extend<T: IntoIterator<Item = MetricRow>>(&mut self, iter: T) {
        self.rows.extend(iter);
    }
}

impl FromIterator<MetricRow> for AggregatedTable {
    fn from_iter<T: IntoIterator<Item = MetricRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    fn sample() -> AggregatedTable {
        AggregatedTable::from_rows(vec![
            MetricRow::builder("pg_ape_se3", ExperimentKey::new(10, 1))
                .metric("rmse", 1.0)
                .build(),
            MetricRow::builder("zed_ape_se3", ExperimentKey::new(0, 1))
                .metric("rmse", 2.0)
                .metric("max", 4.0)
                .build(),
        ])
    }

    #[test]
    fn test_table_default() {
        let table = AggregatedTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_names_and_columns_sorted() {
        let table = sample();
        assert_eq!(table.names(), vec!["pg_ape_se3", "zed_ape_se3"]);
        assert_eq!(table.metric_columns(), vec!["max", "rmse"]);
        assert_eq!(
            table.keys(),
            vec![ExperimentKey::new(0, 1), ExperimentKey::new(10, 1)]
        );
    }

    #[test]
    fn test_to_record_batch_long_form() {
        let batch = sample().to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);

        let max = batch
            .column_by_name("max")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!(max.is_null(0));
        assert!((max.value(1) - 4.0).abs() < f64::EPSILON);
    }
}
