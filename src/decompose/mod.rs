//! Effect decomposition over an [`ExperimentMatrix`](crate::matrix::ExperimentMatrix)
//!
//! Two interaction conventions live here and are deliberately separate:
//!
//! | Operation | Reference point | Interaction term |
//! |---|---|---|
//! | [`two_way_decomposition`] | grand mean `mu` | `gamma[i,h] = M - mu - alpha[i] - beta[h]` |
//! | [`superposition_gamma_grid`] | cell `(0, 1)` | `Gamma(i,h) = M(i,h) - M(i,1) - M(0,h) + M(0,1)` |
//!
//! Neither falls back to the other. Alongside them:
//! [`superposition_check`] tests additivity over four explicit cells and
//! [`BaselineComparison`] measures the matrix against an external reference.

mod anchored;
mod baseline;
mod superposition;
mod two_way;

pub use anchored::{superposition_gamma_grid, GammaGrid};
pub use baseline::{resolve_baseline, BaselineComparison, BaselineMode};
pub use superposition::{superposition_check, SuperpositionCheckResult, SuperpositionPoints, INTERACTION_NOTE};
pub use two_way::{two_way_decomposition, DecompositionResult};
