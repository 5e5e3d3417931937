//! Row selection
//!
//! Narrows an [`AggregatedTable`] to the rows of one measurement series.
//!
//! Matching is literal and case-sensitive:
//! - [`MatchMode::Exact`]: identifying value equals the target
//! - [`MatchMode::ExactOrContains`]: exact match first; only when nothing
//!   matches exactly, fall back to substring containment
//!
//! The target is never interpreted as a regular expression. Regex filtering
//! belongs to the aggregation step ([`crate::aggregate::AggregateOptions`]).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::experiment::{AggregatedTable, MetricRow};
use crate::{Error, Result};

/// Maximum number of available names reported by [`Error::NoMatch`]
pub const MAX_EXAMPLE_NAMES: usize = 10;

/// How the target series name is matched against identifying values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Identifying value equals the target
    #[default]
    Exact,
    /// Exact match, falling back to substring containment
    ExactOrContains,
}

/// Select the rows of one series.
///
/// ```rust
/// use sweep_effects::experiment::{AggregatedTable, ExperimentKey, MetricRow};
/// use sweep_effects::query::{select_rows, MatchMode};
///
/// let table = AggregatedTable::from_rows(vec![
///     MetricRow::builder("pg_ape_se3.zip", ExperimentKey::new(0, 1)).metric("rmse", 5.0).build(),
///     MetricRow::builder("zed_ape_se3.zip", ExperimentKey::new(0, 1)).metric("rmse", 6.0).build(),
/// ]);
///
/// let rows = select_rows(&table, "pg_ape_se3", MatchMode::ExactOrContains)?;
/// assert_eq!(rows.len(), 1);
/// # Ok::<(), sweep_effects::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::NoMatch`] carrying up to [`MAX_EXAMPLE_NAMES`] names
/// actually present if nothing matches.
pub fn select_rows(table: &AggregatedTable, pattern: &str, mode: MatchMode) -> Result<Vec<MetricRow>> {
    let mut selected: Vec<MetricRow> = table
        .rows()
        .iter()
        .filter(|row| row.name() == pattern)
        .cloned()
        .collect();

    if selected.is_empty() && mode == MatchMode::ExactOrContains {
        selected = table
            .rows()
            .iter()
            .filter(|row| row.name().contains(pattern))
            .cloned()
            .collect();
        debug!(pattern, rows = selected.len(), "no exact match, used substring match");
    }

    if selected.is_empty() {
        let mut available = table.names();
        available.truncate(MAX_EXAMPLE_NAMES);
        return Err(Error::NoMatch {
            pattern: pattern.to_string(),
            available,
        });
    }

    Ok(selected)
}
