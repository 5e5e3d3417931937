//! Tidy (long-form) enumeration of analysis outputs
//!
//! Every output structure flattens into [`TidyRow`]s: one row per named
//! field per coordinate. The formatting layer (CSV, plots, LaTeX) consumes
//! these rows, or the equivalent Arrow batch from [`to_record_batch`].
//!
//! | block | field | iters | history |
//! |---|---|---|---|
//! | `matrix` | `value` | ✓ | ✓ |
//! | `mu` | `mu_global_mean` | | |
//! | `alpha` | `alpha_iters_main_effect` | ✓ | |
//! | `beta` | `beta_history_main_effect` | | ✓ |
//! | `gamma` | `gamma_interaction_residual` | ✓ | ✓ |
//! | `superposition_gamma` | `gamma_anchored_residual` | ✓ | ✓ |
//! | `superposition` | `m_baseline`, `m_a`, ... | ✓ | ✓ |
//! | `baseline` | `baseline`, `delta`, `ratio` | ✓ | ✓ |
//! | `summary` | `best_value`, `worst_value`, `mean_over_*` | ✓ | ✓ |
//!
//! Superposition rows also carry text in `detail`: the point label of each
//! read value (`baseline=0_1`, `ab=33_10`, ...) and, on the interaction row,
//! the sign convention note.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::decompose::{BaselineComparison, DecompositionResult, GammaGrid, SuperpositionCheckResult};
use crate::experiment::ExperimentKey;
use crate::matrix::{EffectSummary, ExperimentMatrix};
use crate::Result;

/// One named value of an analysis output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRow {
    /// Output block (`mu`, `alpha`, `gamma`, ...)
    pub block: String,
    /// Field name within the block
    pub field: String,
    /// Row coordinate, if the field is indexed by `iters`
    pub iters: Option<u64>,
    /// Column coordinate, if the field is indexed by `history`
    pub history: Option<u64>,
    /// Value; `None` for missing cells
    pub value: Option<f64>,
    /// Free-text annotation (point labels, sign convention)
    pub detail: Option<String>,
}

impl TidyRow {
    fn new(block: &str, field: &str, iters: Option<u64>, history: Option<u64>, value: Option<f64>) -> Self {
        Self {
            block: block.to_string(),
            field: field.to_string(),
            iters,
            history,
            value,
            detail: None,
        }
    }

    fn at(block: &str, field: &str, key: ExperimentKey, value: Option<f64>) -> Self {
        Self::new(block, field, Some(key.iters()), Some(key.history()), value)
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Flatten an output into tidy rows
pub trait Tidy {
    /// All named fields of `self`, one row per value
    fn tidy(&self) -> Vec<TidyRow>;
}

fn matrix_rows(block: &str, field: &str, matrix: &ExperimentMatrix) -> Vec<TidyRow> {
    matrix
        .cells()
        .map(|(key, value)| TidyRow::at(block, field, key, value))
        .collect()
}

impl Tidy for ExperimentMatrix {
    fn tidy(&self) -> Vec<TidyRow> {
        matrix_rows("matrix", "value", self)
    }
}

impl Tidy for DecompositionResult {
    fn tidy(&self) -> Vec<TidyRow> {
        let mut rows = vec![TidyRow::new("mu", "mu_global_mean", None, None, Some(self.mu()))];
        rows.extend(
            self.iters()
                .iter()
                .zip(self.alpha_values())
                .map(|(&i, &a)| TidyRow::new("alpha", "alpha_iters_main_effect", Some(i), None, a)),
        );
        rows.extend(
            self.history()
                .iter()
                .zip(self.beta_values())
                .map(|(&h, &b)| TidyRow::new("beta", "beta_history_main_effect", None, Some(h), b)),
        );
        rows.extend(matrix_rows("gamma", "gamma_interaction_residual", self.gamma_matrix()));
        rows
    }
}

impl Tidy for GammaGrid {
    fn tidy(&self) -> Vec<TidyRow> {
        matrix_rows("superposition_gamma", "gamma_anchored_residual", self.as_matrix())
    }
}

impl Tidy for SuperpositionCheckResult {
    fn tidy(&self) -> Vec<TidyRow> {
        let p = &self.points;
        let block = "superposition";
        vec![
            TidyRow::at(block, "m_baseline", p.baseline, Some(self.m_baseline))
                .with_detail(format!("baseline={}", p.baseline)),
            TidyRow::at(block, "m_a", p.a, Some(self.m_a)).with_detail(format!("a={}", p.a)),
            TidyRow::at(block, "m_b", p.b, Some(self.m_b)).with_detail(format!("b={}", p.b)),
            TidyRow::at(block, "m_ab_observed", p.ab, Some(self.m_ab_observed))
                .with_detail(format!("ab={}", p.ab)),
            TidyRow::at(block, "m_ab_expected_additive", p.ab, Some(self.m_ab_expected_additive))
                .with_detail(format!("ab={}", p.ab)),
            TidyRow::at(block, "interaction_observed_minus_expected", p.ab, Some(self.interaction))
                .with_detail(self.note),
        ]
    }
}

impl Tidy for BaselineComparison {
    fn tidy(&self) -> Vec<TidyRow> {
        let mut rows = vec![TidyRow::new("baseline", "baseline", None, None, Some(self.baseline()))];
        rows.extend(matrix_rows("baseline", "delta", self.delta()));
        rows.extend(matrix_rows("baseline", "ratio", self.ratio()));
        rows
    }
}

impl Tidy for EffectSummary {
    fn tidy(&self) -> Vec<TidyRow> {
        let mut rows = vec![
            TidyRow::at("summary", "best_value", self.best.key, Some(self.best.value)),
            TidyRow::at("summary", "worst_value", self.worst.key, Some(self.worst.value)),
        ];
        rows.extend(
            self.iters_means
                .iter()
                .map(|m| TidyRow::new("summary", "mean_over_histories", Some(m.at), None, m.mean)),
        );
        rows.extend(
            self.history_means
                .iter()
                .map(|m| TidyRow::new("summary", "mean_over_iters", None, Some(m.at), m.mean)),
        );
        rows
    }
}

/// Tidy rows as an Arrow `RecordBatch` with columns
/// `block, field, iters, history, value, detail` (the last four nullable).
///
/// # Errors
///
/// Returns error if the batch cannot be assembled
pub fn to_record_batch(rows: &[TidyRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("block", DataType::Utf8, false),
        Field::new("field", DataType::Utf8, false),
        Field::new("iters", DataType::UInt64, true),
        Field::new("history", DataType::UInt64, true),
        Field::new("value", DataType::Float64, true),
        Field::new("detail", DataType::Utf8, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.block.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.field.as_str()))),
        Arc::new(rows.iter().map(|r| r.iters).collect::<UInt64Array>()),
        Arc::new(rows.iter().map(|r| r.history).collect::<UInt64Array>()),
        Arc::new(rows.iter().map(|r| r.value).collect::<Float64Array>()),
        Arc::new(rows.iter().map(|r| r.detail.as_deref()).collect::<StringArray>()),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}
