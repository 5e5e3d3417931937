//! Row aggregation across runs
//!
//! Loads every run's metric table, tags each row with the run's
//! [`ExperimentKey`] and concatenates everything into one long-form
//! [`AggregatedTable`].

use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::experiment::{AggregatedTable, ExperimentKey, MetricRow};
use crate::storage::MetricTable;
use crate::{Error, Result};

/// Aggregation settings
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    include: Option<Regex>,
}

impl AggregateOptions {
    /// No filtering: every row of every file is kept
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only rows whose identifying value matches `pattern` anywhere
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `pattern` is not a valid regex
    pub fn with_include(mut self, pattern: &str) -> Result<Self> {
        self.include = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Active include filter, if any
    #[must_use]
    pub const fn include(&self) -> Option<&Regex> {
        self.include.as_ref()
    }

    fn keeps(&self, row: &MetricRow) -> bool {
        self.include
            .as_ref()
            .map_or(true, |re| re.is_match(row.name()))
    }
}

/// Load and concatenate the metric files of a sweep.
///
/// Each file's [`ExperimentKey`] comes from its nearest `<iters>_<history>`
/// ancestor directory.
///
/// # Errors
///
/// - [`Error::LabelNotFound`] if a path carries no run label
/// - [`Error::StorageError`] / [`Error::NoIdentifyingColumn`] if a file cannot be read
/// - [`Error::EmptyAggregation`] if no row survives across all files
pub fn aggregate_experiments<P: AsRef<Path>>(
    files: &[P],
    options: &AggregateOptions,
) -> Result<AggregatedTable> {
    let mut table = AggregatedTable::new();

    for file in files {
        let path = file.as_ref();
        let key = ExperimentKey::from_path(path)?;
        let metrics = MetricTable::load_csv(path)?;
        let loaded = metrics.num_rows();

        let before = table.len();
        table.extend(
            metrics
                .to_rows(key)?
                .into_iter()
                .filter(|row| options.keeps(row)),
        );

        debug!(
            path = %path.display(),
            label = %key,
            loaded,
            kept = table.len() - before,
            "aggregated metric file"
        );
    }

    if table.is_empty() {
        return Err(Error::EmptyAggregation { files: files.len() });
    }

    info!(
        files = files.len(),
        rows = table.len(),
        runs = table.keys().len(),
        "aggregation complete"
    );

    Ok(table)
}
