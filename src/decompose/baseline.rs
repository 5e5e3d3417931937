//! Baseline-relative comparison
//!
//! The baseline is a scalar taken from a reference series (e.g. an
//! independent odometry source) measured in the same runs. Two ways of
//! reducing that series to one value are offered; they can disagree and
//! neither is treated as the "true" baseline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::anchored::{ANCHOR_HISTORY, ANCHOR_ITERS};
use crate::experiment::AggregatedTable;
use crate::matrix::{mean_filled, ExperimentMatrix};
use crate::query::{select_rows, MatchMode};
use crate::{Error, Result};

/// How the baseline series is reduced to a scalar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Mean over every occurrence of the series across all input files
    #[default]
    SeriesMean,
    /// The series' own `(0, 1)` cell, falling back to the series mean
    ReferenceCell,
}

/// Reduce a baseline series to one value for `metric`.
///
/// # Errors
///
/// - [`Error::NoMatch`] if the series is not in the table
/// - [`Error::MetricNotFound`] if its rows do not carry `metric`
/// - [`Error::EmptyMatrix`] if every occurrence has an empty `metric` cell
pub fn resolve_baseline(
    table: &AggregatedTable,
    series: &str,
    match_mode: MatchMode,
    metric: &str,
    mode: BaselineMode,
) -> Result<f64> {
    let rows = select_rows(table, series, match_mode)?;
    let matrix = ExperimentMatrix::pivot(&rows, metric)?;
    let series_mean = mean_filled(rows.iter().map(|row| row.metric(metric))).ok_or(Error::EmptyMatrix)?;

    let value = match mode {
        BaselineMode::SeriesMean => series_mean,
        BaselineMode::ReferenceCell => matrix
            .get(ANCHOR_ITERS, ANCHOR_HISTORY)
            .unwrap_or_else(|| {
                warn!(
                    series,
                    metric,
                    "baseline series has no ({ANCHOR_ITERS},{ANCHOR_HISTORY}) cell, using series mean"
                );
                series_mean
            }),
    };

    debug!(series, metric, ?mode, value, occurrences = rows.len(), "resolved baseline");
    Ok(value)
}

/// Elementwise comparison of a matrix against a scalar baseline
///
/// `delta = baseline - M` (positive means the cell beats a lower-is-better
/// baseline) and `ratio = delta / baseline`. Missing cells stay missing in
/// both; `ratio` is missing everywhere when the baseline is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineComparison {
    baseline: f64,
    delta: ExperimentMatrix,
    ratio: ExperimentMatrix,
}

impl BaselineComparison {
    /// Compare `matrix` against `baseline`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `baseline` is not finite.
    pub fn compute(baseline: f64, matrix: &ExperimentMatrix) -> Result<Self> {
        if !baseline.is_finite() {
            return Err(Error::Config(format!("baseline must be finite, got {baseline}")));
        }

        let delta = matrix.map_filled(|m| baseline - m);
        let ratio = delta.map_cells(|_, d| if baseline == 0.0 { None } else { d.map(|d| d / baseline) });

        Ok(Self {
            baseline,
            delta,
            ratio,
        })
    }

    /// Baseline value
    #[must_use]
    pub const fn baseline(&self) -> f64 {
        self.baseline
    }

    /// `baseline - M`
    #[must_use]
    pub const fn delta(&self) -> &ExperimentMatrix {
        &self.delta
    }

    /// `(baseline - M) / baseline`
    #[must_use]
    pub const fn ratio(&self) -> &ExperimentMatrix {
        &self.ratio
    }
}
