//! Experiment matrix (iters × history)
//!
//! A dense grid over the sorted distinct `iters` values (rows) and the
//! sorted distinct `history` values (columns) of a sweep. Gaps in either
//! axis are fine; combinations that were never run are *missing* cells.
//!
//! Missing cells are `None`, never a float sentinel: every operation that
//! averages skips them, and every elementwise operation keeps them missing.

mod summary;

pub use summary::{AxisMean, CellValue, EffectSummary};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::experiment::{ExperimentKey, MetricRow};
use crate::{Error, Result};

/// Arithmetic mean of the filled values; `None` if there are none.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_filled(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// 2D metric matrix indexed by `iters` (rows) and `history` (columns)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentMatrix {
    iters: Vec<u64>,
    history: Vec<u64>,
    /// Row-major, `iters.len() * history.len()` cells
    cells: Vec<Option<f64>>,
}

impl ExperimentMatrix {
    /// Create a matrix from axes and row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMatrix`] if an axis is not strictly increasing,
    /// the cell count does not match the axes, or a filled cell is not finite
    /// (missing cells are `None`, never NaN).
    pub fn from_cells(iters: Vec<u64>, history: Vec<u64>, cells: Vec<Option<f64>>) -> Result<Self> {
        let strictly_increasing = |axis: &[u64]| axis.windows(2).all(|w| w[0] < w[1]);
        if !strictly_increasing(&iters) {
            return Err(Error::InvalidMatrix(format!(
                "iters axis must be strictly increasing, got {iters:?}"
            )));
        }
        if !strictly_increasing(&history) {
            return Err(Error::InvalidMatrix(format!(
                "history axis must be strictly increasing, got {history:?}"
            )));
        }
        if cells.len() != iters.len() * history.len() {
            return Err(Error::InvalidMatrix(format!(
                "expected {}x{} = {} cells, got {}",
                iters.len(),
                history.len(),
                iters.len() * history.len(),
                cells.len()
            )));
        }
        if let Some(pos) = cells.iter().position(|c| c.is_some_and(|v| !v.is_finite())) {
            return Err(Error::InvalidMatrix(format!(
                "cell {pos} is not finite: {:?}",
                cells[pos]
            )));
        }
        Ok(Self {
            iters,
            history,
            cells,
        })
    }

    /// Create a matrix from sparse `(key, value)` entries.
    ///
    /// Axes are the distinct coordinates present; duplicate keys are averaged.
    /// Non-finite values count as missing.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (ExperimentKey, Option<f64>)>) -> Self {
        let mut groups: BTreeMap<ExperimentKey, Vec<Option<f64>>> = BTreeMap::new();
        for (key, value) in entries {
            groups.entry(key).or_default().push(value);
        }

        let iters: Vec<u64> = groups
            .keys()
            .map(ExperimentKey::iters)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let history: Vec<u64> = groups
            .keys()
            .map(ExperimentKey::history)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let cells = iters
            .iter()
            .flat_map(|&i| history.iter().map(move |&h| ExperimentKey::new(i, h)))
            .map(|key| {
                groups.remove(&key).and_then(|values| {
                    mean_filled(values.into_iter().map(|v| v.filter(|x| x.is_finite())))
                })
            })
            .collect();

        Self {
            iters,
            history,
            cells,
        }
    }

    /// Pivot selected rows into a matrix for one metric.
    ///
    /// Cell `(i, h)` is the mean of every row of run `(i, h)` that has a
    /// value for `metric`. Axis values come from all selected rows.
    ///
    /// ```rust
    /// use sweep_effects::experiment::{ExperimentKey, MetricRow};
    /// use sweep_effects::matrix::ExperimentMatrix;
    ///
    /// let rows = vec![
    ///     MetricRow::builder("pg", ExperimentKey::new(10, 1)).metric("rmse", 4.0).build(),
    ///     MetricRow::builder("pg", ExperimentKey::new(10, 1)).metric("rmse", 2.0).build(),
    ///     MetricRow::builder("pg", ExperimentKey::new(0, 10)).metric("rmse", 3.0).build(),
    /// ];
    ///
    /// let m = ExperimentMatrix::pivot(&rows, "rmse")?;
    /// assert_eq!(m.iters(), &[0, 10]);
    /// assert_eq!(m.history(), &[1, 10]);
    /// assert_eq!(m.get(10, 1), Some(3.0));
    /// assert_eq!(m.get(0, 1), None);
    /// # Ok::<(), sweep_effects::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetricNotFound`] if no selected row carries `metric`.
    pub fn pivot(rows: &[MetricRow], metric: &str) -> Result<Self> {
        if !rows.iter().any(|row| row.has_metric(metric)) {
            let available = rows
                .iter()
                .flat_map(MetricRow::metric_names)
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            return Err(Error::MetricNotFound {
                metric: metric.to_string(),
                available,
            });
        }

        let matrix = Self::from_entries(rows.iter().map(|row| (row.key(), row.metric(metric))));

        info!(
            metric,
            rows = matrix.iters.len(),
            cols = matrix.history.len(),
            "built experiment matrix"
        );
        if matrix.missing_count() > 0 {
            warn!(
                metric,
                missing = matrix.missing_count(),
                "experiment matrix has missing cells"
            );
        }

        Ok(matrix)
    }

    /// Row axis: sorted distinct `iters` values
    #[must_use]
    pub fn iters(&self) -> &[u64] {
        &self.iters
    }

    /// Column axis: sorted distinct `history` values
    #[must_use]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// `(rows, cols)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.iters.len(), self.history.len())
    }

    /// Position of `iters` on the row axis
    #[must_use]
    pub fn row_index(&self, iters: u64) -> Option<usize> {
        self.iters.binary_search(&iters).ok()
    }

    /// Position of `history` on the column axis
    #[must_use]
    pub fn col_index(&self, history: u64) -> Option<usize> {
        self.history.binary_search(&history).ok()
    }

    /// Cell by position; `None` if missing or out of range
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.iters.len() || col >= self.history.len() {
            return None;
        }
        self.cells[row * self.history.len() + col]
    }

    /// Cell by axis values; `None` if missing or not on an axis
    #[must_use]
    pub fn get(&self, iters: u64, history: u64) -> Option<f64> {
        self.cell(self.row_index(iters)?, self.col_index(history)?)
    }

    /// Cell by key
    #[must_use]
    pub fn value(&self, key: ExperimentKey) -> Option<f64> {
        self.get(key.iters(), key.history())
    }

    /// Values of one row (all history columns)
    pub fn row(&self, row: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.history.len()).map(move |col| self.cell(row, col))
    }

    /// Values of one column (all iters rows)
    pub fn column(&self, col: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.iters.len()).map(move |row| self.cell(row, col))
    }

    /// Every cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (ExperimentKey, Option<f64>)> + '_ {
        self.iters.iter().enumerate().flat_map(move |(row, &i)| {
            self.history
                .iter()
                .enumerate()
                .map(move |(col, &h)| (ExperimentKey::new(i, h), self.cell(row, col)))
        })
    }

    /// Filled cells in row-major order
    pub fn filled(&self) -> impl Iterator<Item = (ExperimentKey, f64)> + '_ {
        self.cells().filter_map(|(key, value)| value.map(|v| (key, v)))
    }

    /// Number of filled cells
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Number of missing cells
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.cells.len() - self.filled_count()
    }

    /// Same axes, each cell computed from its key and value.
    ///
    /// `f` sees missing cells as `None` and decides the output per cell.
    #[must_use]
    pub fn map_cells(&self, mut f: impl FnMut(ExperimentKey, Option<f64>) -> Option<f64>) -> Self {
        let cells = self.cells().map(|(key, value)| f(key, value)).collect();
        Self {
            iters: self.iters.clone(),
            history: self.history.clone(),
            cells,
        }
    }

    /// Same axes, `f` applied to filled cells; missing cells stay missing.
    #[must_use]
    pub fn map_filled(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        self.map_cells(|_, value| value.map(&mut f))
    }
}
