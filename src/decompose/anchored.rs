//! Axis-anchored superposition residual ("Gamma" grid)
//!
//! Anchored at the reference cell `(iters = 0, history = 1)` instead of the
//! grand mean:
//!
//! ```text
//! Gamma(i,h) = M(i,h) - M(i,1) - M(0,h) + M(0,1)
//! ```
//!
//! `Gamma` is zero along the `iters = 0` row and the `history = 1` column.

use serde::Serialize;

use crate::matrix::ExperimentMatrix;
use crate::{Error, Result};

/// Reference `iters` row of the grid
pub const ANCHOR_ITERS: u64 = 0;

/// Reference `history` column of the grid
pub const ANCHOR_HISTORY: u64 = 1;

/// Anchored interaction residuals, indexed like the source matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GammaGrid {
    grid: ExperimentMatrix,
}

impl GammaGrid {
    /// Residual at `(iters, history)`; `None` where any of the four
    /// referenced cells is missing
    #[must_use]
    pub fn get(&self, iters: u64, history: u64) -> Option<f64> {
        self.grid.get(iters, history)
    }

    /// Row axis
    #[must_use]
    pub fn iters(&self) -> &[u64] {
        self.grid.iters()
    }

    /// Column axis
    #[must_use]
    pub fn history(&self) -> &[u64] {
        self.grid.history()
    }

    /// Residuals as a matrix
    #[must_use]
    pub const fn as_matrix(&self) -> &ExperimentMatrix {
        &self.grid
    }
}

/// Compute the anchored Gamma grid of `matrix`.
///
/// # Errors
///
/// Returns [`Error::SuperpositionPrecondition`] if the matrix has no
/// `iters = 0` row or no `history = 1` column.
pub fn superposition_gamma_grid(matrix: &ExperimentMatrix) -> Result<GammaGrid> {
    let mut missing = Vec::new();
    if matrix.row_index(ANCHOR_ITERS).is_none() {
        missing.push(format!("iters={ANCHOR_ITERS} row"));
    }
    if matrix.col_index(ANCHOR_HISTORY).is_none() {
        missing.push(format!("history={ANCHOR_HISTORY} column"));
    }
    if !missing.is_empty() {
        return Err(Error::SuperpositionPrecondition { missing });
    }

    let anchor = matrix.get(ANCHOR_ITERS, ANCHOR_HISTORY);
    let grid = matrix.map_cells(|key, value| {
        let m = value?;
        let m_i1 = matrix.get(key.iters(), ANCHOR_HISTORY)?;
        let m_0h = matrix.get(ANCHOR_ITERS, key.history())?;
        let m_01 = anchor?;
        // (M(i,h) - M(0,h)) - (M(i,1) - M(0,1)): exact zero on both anchor lines
        Some((m - m_0h) - (m_i1 - m_01))
    });

    Ok(GammaGrid { grid })
}
