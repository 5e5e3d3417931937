//! Effect summary: extreme cells and per-axis means

use serde::Serialize;

use super::{mean_filled, ExperimentMatrix};
use crate::experiment::ExperimentKey;
use crate::{Error, Result};

/// A filled cell and its coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellValue {
    /// Cell coordinate
    pub key: ExperimentKey,
    /// Cell value
    pub value: f64,
}

/// Mean of one row or column, skipping missing cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisMean {
    /// `iters` value for a row mean, `history` value for a column mean
    pub at: u64,
    /// `None` if the row/column has no filled cell
    pub mean: Option<f64>,
}

/// Compact overview of a matrix.
///
/// "Best" is the minimum, matching lower-is-better error metrics.
/// Ties resolve to the first cell in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSummary {
    /// Minimum filled cell
    pub best: CellValue,
    /// Maximum filled cell
    pub worst: CellValue,
    /// Mean over histories, one entry per `iters`
    pub iters_means: Vec<AxisMean>,
    /// Mean over iters, one entry per `history`
    pub history_means: Vec<AxisMean>,
}

impl EffectSummary {
    /// Summarize `matrix`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMatrix`] if no cell is filled.
    pub fn compute(matrix: &ExperimentMatrix) -> Result<Self> {
        let mut filled = matrix.filled();
        let (key, value) = filled.next().ok_or(Error::EmptyMatrix)?;
        let first = CellValue { key, value };

        let (best, worst) = filled.fold((first, first), |(best, worst), (key, value)| {
            (
                if value < best.value { CellValue { key, value } } else { best },
                if value > worst.value { CellValue { key, value } } else { worst },
            )
        });

        let iters_means = matrix
            .iters()
            .iter()
            .enumerate()
            .map(|(row, &at)| AxisMean {
                at,
                mean: mean_filled(matrix.row(row)),
            })
            .collect();
        let history_means = matrix
            .history()
            .iter()
            .enumerate()
            .map(|(col, &at)| AxisMean {
                at,
                mean: mean_filled(matrix.column(col)),
            })
            .collect();

        Ok(Self {
            best,
            worst,
            iters_means,
            history_means,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_best_worst() {
        let m = ExperimentMatrix::from_cells(
            vec![0, 10],
            vec![1, 10],
            vec![Some(5.0), Some(3.0), Some(4.0), Some(1.5)],
        )
        .unwrap();
        let summary = EffectSummary::compute(&m).unwrap();

        assert_eq!(summary.best.key, ExperimentKey::new(10, 10));
        assert_eq!(summary.worst.key, ExperimentKey::new(0, 1));
        assert_eq!(summary.iters_means[0], AxisMean { at: 0, mean: Some(4.0) });
        assert_eq!(summary.history_means[1], AxisMean { at: 10, mean: Some(2.25) });
    }

    #[test]
    fn test_summary_ties_first_wins() {
        let m = ExperimentMatrix::from_cells(vec![0, 1], vec![1], vec![Some(2.0), Some(2.0)]).unwrap();
        let summary = EffectSummary::compute(&m).unwrap();
        assert_eq!(summary.best.key, ExperimentKey::new(0, 1));
        assert_eq!(summary.worst.key, ExperimentKey::new(0, 1));
    }

    #[test]
    fn test_summary_empty_matrix() {
        let m = ExperimentMatrix::from_cells(vec![0], vec![1], vec![None]).unwrap();
        assert!(matches!(EffectSummary::compute(&m), Err(Error::EmptyMatrix)));
    }
}
