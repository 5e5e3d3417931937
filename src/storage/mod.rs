//! Storage backend (Arrow CSV)
//!
//! Each run writes one small metric table: an identifying column holding
//! series names (`pg_ape_se3`, `zed_rpe_100m`, ...) and one numeric column
//! per statistic. Tables are read whole into Arrow record batches and then
//! flattened into [`MetricRow`]s.
//!
//! ## Identifying-column resolution
//!
//! The identifying column is picked by an explicit ordered rule set, and the
//! rule that matched is logged:
//!
//! 1. [`IdColumnRule::PreferredName`]: first of [`PREFERRED_ID_COLUMNS`] present
//! 2. [`IdColumnRule::FirstStringColumn`]: first `Utf8` column
//! 3. [`IdColumnRule::FirstColumn`]: first column outright
//!
//! A table with no columns at all fails with [`Error::NoIdentifyingColumn`].

use crate::experiment::{ExperimentKey, MetricRow};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Column names accepted as the identifying column, in priority order
pub const PREFERRED_ID_COLUMNS: [&str; 6] = ["pattern", "name", "key", "label", "metric", "id"];

/// Columns the aggregator adds itself; never read as metrics
const RESERVED_COLUMNS: [&str; 3] = ["iters", "history", "exp_label"];

/// Number of records sampled for CSV schema inference
const SCHEMA_INFERENCE_RECORDS: usize = 1000;

/// Which resolution rule picked the identifying column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdColumnRule {
    /// Column named like one of [`PREFERRED_ID_COLUMNS`]
    PreferredName,
    /// First string-typed column
    FirstStringColumn,
    /// First column, whatever its type
    FirstColumn,
}

/// Resolved identifying column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdColumn {
    /// Column position in the schema
    pub index: usize,
    /// Column name as written in the file (may be empty)
    pub name: String,
    /// Rule that matched
    pub rule: IdColumnRule,
}

/// Resolve the identifying column of a metric table schema.
///
/// Returns `None` only for a schema without columns.
#[must_use]
pub fn resolve_id_column(schema: &Schema) -> Option<IdColumn> {
    let fields = schema.fields();

    let preferred = PREFERRED_ID_COLUMNS.iter().find_map(|wanted| {
        fields
            .iter()
            .position(|field| field.name() == *wanted)
            .map(|index| (index, IdColumnRule::PreferredName))
    });

    let resolved = preferred
        .or_else(|| {
            fields
                .iter()
                .position(|field| matches!(field.data_type(), DataType::Utf8 | DataType::LargeUtf8))
                .map(|index| (index, IdColumnRule::FirstStringColumn))
        })
        .or_else(|| (!fields.is_empty()).then_some((0, IdColumnRule::FirstColumn)));

    resolved.map(|(index, rule)| IdColumn {
        index,
        name: fields[index].name().clone(),
        rule,
    })
}

/// One run's metric table, held in memory as Arrow batches
#[derive(Debug, Clone)]
pub struct MetricTable {
    path: PathBuf,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MetricTable {
    /// Create a metric table from existing batches
    ///
    /// Useful for testing
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self {
            path: path.into(),
            schema,
            batches,
        }
    }

    /// Load a metric table from a CSV file with a header row
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open CSV file {}: {e}", path.display()))
        })?;

        let (schema, _) = Format::default()
            .with_header(true)
            .infer_schema(&mut file, Some(SCHEMA_INFERENCE_RECORDS))
            .map_err(|e| {
                Error::StorageError(format!("Failed to infer CSV schema of {}: {e}", path.display()))
            })?;
        file.seek(SeekFrom::Start(0))?;

        let schema = Arc::new(schema);
        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(true)
            .build(file)
            .map_err(|e| {
                Error::StorageError(format!("Failed to create CSV reader: {e}"))
            })?;

        // Read all batches into memory
        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            batches,
        })
    }

    /// Source path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table schema
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// All record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Resolve the identifying column
    ///
    /// # Errors
    /// Returns [`Error::NoIdentifyingColumn`] if the table has no columns
    pub fn id_column(&self) -> Result<IdColumn> {
        let id = resolve_id_column(&self.schema).ok_or_else(|| Error::NoIdentifyingColumn {
            path: self.path.clone(),
        })?;
        debug!(
            path = %self.path.display(),
            column = %id.name,
            rule = ?id.rule,
            "resolved identifying column"
        );
        Ok(id)
    }

    /// Flatten the table into rows tagged with `key`
    ///
    /// Every numeric column other than the identifying one becomes a metric;
    /// empty cells and NaN become missing values.
    ///
    /// # Errors
    /// Returns error if no identifying column exists or a column cannot be cast
    pub fn to_rows(&self, key: ExperimentKey) -> Result<Vec<MetricRow>> {
        let id = self.id_column()?;

        let metric_columns: Vec<(usize, String)> = self
            .schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != id.index)
            .filter_map(|(index, field)| {
                let name = field.name();
                if RESERVED_COLUMNS.contains(&name.as_str()) {
                    return None;
                }
                if field.data_type().is_numeric() || *field.data_type() == DataType::Null {
                    Some((index, name.clone()))
                } else {
                    debug!(
                        path = %self.path.display(),
                        column = %name,
                        data_type = ?field.data_type(),
                        "skipping non-numeric column"
                    );
                    None
                }
            })
            .collect();

        let mut rows = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let names = cast(batch.column(id.index), &DataType::Utf8)?;
            let names = downcast::<StringArray>(&names, &id.name)?;

            let casts = metric_columns
                .iter()
                .map(|(index, name)| cast(batch.column(*index), &DataType::Float64).map(|a| (name, a)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let values = casts
                .iter()
                .map(|(name, array)| downcast::<Float64Array>(array, name).map(|a| (*name, a)))
                .collect::<Result<Vec<_>>>()?;

            for row_idx in 0..batch.num_rows() {
                let name = if names.is_valid(row_idx) {
                    names.value(row_idx)
                } else {
                    ""
                };
                let mut row = MetricRow::new(name, key);
                for (metric, array) in &values {
                    let value = array
                        .is_valid(row_idx)
                        .then(|| array.value(row_idx))
                        .filter(|v| !v.is_nan());
                    row.set_metric(metric.as_str(), value);
                }
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, column: &str) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::StorageError(format!("Column '{column}' has unexpected type {:?}", array.data_type()))
    })
}
