//! Global-mean-centered two-way decomposition
//!
//! ```text
//! M(i,h) = mu + alpha[i] + beta[h] + gamma[i,h]
//! ```
//!
//! `mu` is the mean of all filled cells, `alpha`/`beta` are row/column means
//! minus `mu`, and `gamma` is whatever the additive model leaves over.
//! Missing cells are excluded from every mean and have no `gamma`.

use serde::Serialize;

use crate::matrix::{mean_filled, ExperimentMatrix};
use crate::{Error, Result};

/// Main effects and interaction residual of a matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionResult {
    mu: f64,
    iters: Vec<u64>,
    history: Vec<u64>,
    alpha: Vec<Option<f64>>,
    beta: Vec<Option<f64>>,
    gamma: ExperimentMatrix,
}

impl DecompositionResult {
    /// Grand mean of all filled cells
    #[must_use]
    pub const fn mu(&self) -> f64 {
        self.mu
    }

    /// Row axis
    #[must_use]
    pub fn iters(&self) -> &[u64] {
        &self.iters
    }

    /// Column axis
    #[must_use]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Main effect of `iters`, aligned with [`iters`](Self::iters)
    #[must_use]
    pub fn alpha_values(&self) -> &[Option<f64>] {
        &self.alpha
    }

    /// Main effect of `history`, aligned with [`history`](Self::history)
    #[must_use]
    pub fn beta_values(&self) -> &[Option<f64>] {
        &self.beta
    }

    /// Main effect of one `iters` value; `None` if off-axis or its row is empty
    #[must_use]
    pub fn alpha(&self, iters: u64) -> Option<f64> {
        let row = self.iters.binary_search(&iters).ok()?;
        self.alpha[row]
    }

    /// Main effect of one `history` value; `None` if off-axis or its column is empty
    #[must_use]
    pub fn beta(&self, history: u64) -> Option<f64> {
        let col = self.history.binary_search(&history).ok()?;
        self.beta[col]
    }

    /// Interaction residual of one cell; `None` for missing cells
    #[must_use]
    pub fn gamma(&self, iters: u64, history: u64) -> Option<f64> {
        self.gamma.get(iters, history)
    }

    /// Interaction residuals as a matrix over the same axes
    #[must_use]
    pub const fn gamma_matrix(&self) -> &ExperimentMatrix {
        &self.gamma
    }

    /// `mu + alpha[i] + beta[h] + gamma[i,h]`; equals `M(i,h)` for filled cells
    #[must_use]
    pub fn reconstruct(&self, iters: u64, history: u64) -> Option<f64> {
        Some(self.mu + self.alpha(iters)? + self.beta(history)? + self.gamma(iters, history)?)
    }
}

/// Decompose `matrix` around its grand mean.
///
/// ```rust
/// use sweep_effects::decompose::two_way_decomposition;
/// use sweep_effects::matrix::ExperimentMatrix;
///
/// let m = ExperimentMatrix::from_cells(
///     vec![0, 10],
///     vec![1, 10],
///     vec![Some(5.0), Some(3.0), Some(4.0), Some(1.5)],
/// )?;
/// let d = two_way_decomposition(&m)?;
/// assert_eq!(d.mu(), 3.375);
/// assert_eq!(d.alpha(0), Some(0.625));
/// assert_eq!(d.beta(10), Some(-1.125));
/// # Ok::<(), sweep_effects::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::EmptyMatrix`] if no cell is filled.
pub fn two_way_decomposition(matrix: &ExperimentMatrix) -> Result<DecompositionResult> {
    let mu = mean_filled(matrix.filled().map(|(_, v)| Some(v))).ok_or(Error::EmptyMatrix)?;

    let (rows, cols) = matrix.shape();
    let alpha: Vec<Option<f64>> = (0..rows)
        .map(|row| mean_filled(matrix.row(row)).map(|m| m - mu))
        .collect();
    let beta: Vec<Option<f64>> = (0..cols)
        .map(|col| mean_filled(matrix.column(col)).map(|m| m - mu))
        .collect();

    let gamma = matrix.map_cells(|key, value| {
        let row = matrix.row_index(key.iters())?;
        let col = matrix.col_index(key.history())?;
        Some(value? - mu - alpha[row]? - beta[col]?)
    });

    Ok(DecompositionResult {
        mu,
        iters: matrix.iters().to_vec(),
        history: matrix.history().to_vec(),
        alpha,
        beta,
        gamma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ExperimentMatrix {
        ExperimentMatrix::from_cells(
            vec![0, 10],
            vec![1, 10],
            vec![Some(5.0), Some(3.0), Some(4.0), Some(1.5)],
        )
        .unwrap()
    }

    #[test]
    fn test_concrete_scenario() {
        let d = two_way_decomposition(&scenario()).unwrap();
        assert!((d.mu() - 3.375).abs() < 1e-12);
        assert!((d.alpha(0).unwrap() - 0.625).abs() < 1e-12);
        assert!((d.alpha(10).unwrap() + 0.625).abs() < 1e-12);
        assert!((d.beta(1).unwrap() - 1.125).abs() < 1e-12);
        assert!((d.beta(10).unwrap() + 1.125).abs() < 1e-12);
        assert!((d.gamma(0, 1).unwrap() + 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_identity_holds_for_every_cell() {
        let m = scenario();
        let d = two_way_decomposition(&m).unwrap();
        for (key, value) in m.filled() {
            let rebuilt = d.reconstruct(key.iters(), key.history()).unwrap();
            assert!((rebuilt - value).abs() <= 1e-9 * value.abs().max(1.0));
        }
    }

    #[test]
    fn test_missing_cell_excluded() {
        let m = ExperimentMatrix::from_cells(
            vec![0, 10],
            vec![1, 10],
            vec![Some(5.0), Some(3.0), Some(4.0), None],
        )
        .unwrap();
        let d = two_way_decomposition(&m).unwrap();

        assert!((d.mu() - 4.0).abs() < 1e-12);
        assert!((d.alpha(10).unwrap() - 0.0).abs() < 1e-12);
        assert!((d.beta(10).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(d.gamma(10, 10), None);
        assert!(d.gamma(0, 1).is_some());
    }

    #[test]
    fn test_empty_row_has_no_effect() {
        let m = ExperimentMatrix::from_cells(vec![0, 5], vec![1], vec![Some(2.0), None]).unwrap();
        let d = two_way_decomposition(&m).unwrap();
        assert_eq!(d.alpha(5), None);
        assert_eq!(d.alpha(7), None);
    }

    #[test]
    fn test_all_missing_is_error() {
        let m = ExperimentMatrix::from_cells(vec![0], vec![1], vec![None]).unwrap();
        assert!(matches!(two_way_decomposition(&m), Err(Error::EmptyMatrix)));
    }
}
