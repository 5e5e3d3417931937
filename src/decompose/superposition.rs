//! Four-point superposition (additivity) check

use serde::{Deserialize, Serialize};

use crate::experiment::ExperimentKey;
use crate::matrix::ExperimentMatrix;
use crate::{Error, Result};

/// Sign convention of [`SuperpositionCheckResult::interaction`].
///
/// The check itself is direction-agnostic; this reading applies to
/// lower-is-better metrics such as rmse.
pub const INTERACTION_NOTE: &str =
    "If lower-is-better: negative interaction => synergy, positive => diminishing returns";

/// The four coordinates of a superposition check
///
/// Typically `baseline = (0,1)`, `a` changes only `iters`, `b` changes only
/// `history`, and `ab` applies both changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperpositionPoints {
    /// Shared reference cell
    pub baseline: ExperimentKey,
    /// First factor change
    pub a: ExperimentKey,
    /// Second factor change
    pub b: ExperimentKey,
    /// Both changes combined
    pub ab: ExperimentKey,
}

/// Outcome of a four-point check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuperpositionCheckResult {
    /// Coordinates that were read
    pub points: SuperpositionPoints,
    /// `M(baseline)`
    pub m_baseline: f64,
    /// `M(a)`
    pub m_a: f64,
    /// `M(b)`
    pub m_b: f64,
    /// `M(ab)`, the observed combined value
    pub m_ab_observed: f64,
    /// `M(baseline) + (M(a) - M(baseline)) + (M(b) - M(baseline))`
    pub m_ab_expected_additive: f64,
    /// `observed - expected`
    pub interaction: f64,
    /// Sign convention, always [`INTERACTION_NOTE`]
    pub note: &'static str,
}

/// Compare the observed combined cell with the additive expectation.
///
/// # Errors
///
/// Returns [`Error::MissingCell`] naming the first of `baseline`, `a`, `b`,
/// `ab` that is not a filled cell.
pub fn superposition_check(
    matrix: &ExperimentMatrix,
    points: SuperpositionPoints,
) -> Result<SuperpositionCheckResult> {
    let read = |role: &str, key: ExperimentKey| {
        matrix.value(key).ok_or_else(|| Error::MissingCell {
            role: role.to_string(),
            key,
        })
    };

    let m_baseline = read("baseline", points.baseline)?;
    let m_a = read("a", points.a)?;
    let m_b = read("b", points.b)?;
    let m_ab_observed = read("ab", points.ab)?;

    // Same value as baseline + (a - baseline) + (b - baseline), evaluated
    // so that an exactly additive `ab` yields an interaction of exactly zero.
    let m_ab_expected_additive = m_a + m_b - m_baseline;
    let interaction = m_ab_observed - m_ab_expected_additive;

    Ok(SuperpositionCheckResult {
        points,
        m_baseline,
        m_a,
        m_b,
        m_ab_observed,
        m_ab_expected_additive,
        interaction,
        note: INTERACTION_NOTE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> SuperpositionPoints {
        SuperpositionPoints {
            baseline: ExperimentKey::new(0, 1),
            a: ExperimentKey::new(10, 1),
            b: ExperimentKey::new(0, 10),
            ab: ExperimentKey::new(10, 10),
        }
    }

    #[test]
    fn test_synergy_is_negative() {
        let m = ExperimentMatrix::from_cells(
            vec![0, 10],
            vec![1, 10],
            vec![Some(5.0), Some(3.0), Some(4.0), Some(1.5)],
        )
        .unwrap();
        let result = superposition_check(&m, points()).unwrap();

        assert!((result.m_ab_expected_additive - 2.0).abs() < 1e-12);
        assert!((result.interaction + 0.5).abs() < 1e-12);
        assert_eq!(result.note, INTERACTION_NOTE);
    }

    #[test]
    fn test_additive_cell_has_zero_interaction() {
        let m = ExperimentMatrix::from_cells(
            vec![0, 10],
            vec![1, 10],
            vec![Some(5.0), Some(3.0), Some(4.0), Some(2.0)],
        )
        .unwrap();
        let result = superposition_check(&m, points()).unwrap();
        assert_eq!(result.interaction, 0.0);
    }

    #[test]
    fn test_missing_point() {
        let m = ExperimentMatrix::from_cells(
            vec![0, 10],
            vec![1, 10],
            vec![Some(5.0), Some(3.0), None, Some(2.0)],
        )
        .unwrap();
        match superposition_check(&m, points()) {
            Err(Error::MissingCell { role, key }) => {
                assert_eq!(role, "a");
                assert_eq!(key, ExperimentKey::new(10, 1));
            }
            other => panic!("expected MissingCell, got {other:?}"),
        }
    }
}
