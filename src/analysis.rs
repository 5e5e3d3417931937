//! One-shot analysis pipeline
//!
//! ```text
//! files ─> aggregate ─> select ─> pivot ─┬─> two-way decomposition
//!                 │                      ├─> effect summary
//!                 │                      ├─> Gamma grid            (if (0,1) axes present)
//!                 │                      ├─> superposition check   (if configured)
//!                 └─> baseline series ───┴─> baseline comparison   (if configured)
//! ```
//!
//! Each call is independent: inputs are read fresh and nothing is cached.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{aggregate_experiments, AggregateOptions};
use crate::decompose::{
    resolve_baseline, superposition_check, superposition_gamma_grid, two_way_decomposition,
    BaselineComparison, BaselineMode, DecompositionResult, GammaGrid, SuperpositionCheckResult,
    SuperpositionPoints,
};
use crate::matrix::{EffectSummary, ExperimentMatrix};
use crate::query::{select_rows, MatchMode};
use crate::tidy::{Tidy, TidyRow};
use crate::{Error, Result};

fn default_metric() -> String {
    "rmse".to_string()
}

/// Baseline series settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Identifying value of the baseline series (e.g. `zed_ape_se3`)
    pub series: String,
    /// How `series` is matched
    #[serde(default)]
    pub match_mode: MatchMode,
    /// How the series is reduced to a scalar
    #[serde(default)]
    pub mode: BaselineMode,
}

/// Settings of one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Metric files, each under an `<iters>_<history>` directory
    pub files: Vec<PathBuf>,
    /// Series to analyze (e.g. `pg_ape_se3`)
    pub pattern: String,
    /// Metric column (rmse, mean, median, std, min, max, sse)
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Optional regex applied to identifying values while loading; the
    /// baseline series is always read unfiltered
    #[serde(default)]
    pub include: Option<String>,
    /// How `pattern` is matched
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Fail instead of skipping the Gamma grid when its anchors are absent
    #[serde(default)]
    pub require_gamma: bool,
    /// Four-point additivity check
    #[serde(default)]
    pub superposition: Option<SuperpositionPoints>,
    /// Baseline comparison
    #[serde(default)]
    pub baseline: Option<BaselineConfig>,
}

impl AnalysisConfig {
    /// Create a builder with the required fields
    #[must_use]
    pub fn builder(files: Vec<PathBuf>, pattern: impl Into<String>) -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new(files, pattern)
    }

    /// Load settings from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid config
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Builder for `AnalysisConfig`
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Create a new builder with required fields
    #[must_use]
    pub fn new(files: Vec<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            config: AnalysisConfig {
                files,
                pattern: pattern.into(),
                metric: default_metric(),
                include: None,
                match_mode: MatchMode::default(),
                require_gamma: false,
                superposition: None,
                baseline: None,
            },
        }
    }

    /// Set the metric column
    #[must_use]
    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.config.metric = metric.into();
        self
    }

    /// Set the load-time include regex
    #[must_use]
    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.config.include = Some(include.into());
        self
    }

    /// Set how the series pattern is matched
    #[must_use]
    pub const fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    /// Fail when the Gamma grid anchors are absent
    #[must_use]
    pub const fn require_gamma(mut self, require: bool) -> Self {
        self.config.require_gamma = require;
        self
    }

    /// Enable the four-point check
    #[must_use]
    pub const fn superposition(mut self, points: SuperpositionPoints) -> Self {
        self.config.superposition = Some(points);
        self
    }

    /// Enable the baseline comparison
    #[must_use]
    pub fn baseline(mut self, baseline: BaselineConfig) -> Self {
        self.config.baseline = Some(baseline);
        self
    }

    /// Build the `AnalysisConfig`
    #[must_use]
    pub fn build(self) -> AnalysisConfig {
        self.config
    }
}

/// Every output of one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Analyzed series
    pub pattern: String,
    /// Analyzed metric
    pub metric: String,
    /// Pivoted matrix
    pub matrix: ExperimentMatrix,
    /// Extreme cells and per-axis means
    pub summary: EffectSummary,
    /// Global-mean decomposition
    pub decomposition: DecompositionResult,
    /// Anchored Gamma grid, when the matrix has the `(0, 1)` anchors
    pub gamma_grid: Option<GammaGrid>,
    /// Four-point check, when configured
    pub superposition: Option<SuperpositionCheckResult>,
    /// Baseline comparison, when configured
    pub baseline: Option<BaselineComparison>,
}

impl AnalysisReport {
    /// Serialize as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Tidy for AnalysisReport {
    fn tidy(&self) -> Vec<TidyRow> {
        let mut rows = self.matrix.tidy();
        rows.extend(self.summary.tidy());
        rows.extend(self.decomposition.tidy());
        if let Some(gamma) = &self.gamma_grid {
            rows.extend(gamma.tidy());
        }
        if let Some(check) = &self.superposition {
            rows.extend(check.tidy());
        }
        if let Some(cmp) = &self.baseline {
            rows.extend(cmp.tidy());
        }
        rows
    }
}

/// Run one analysis end to end.
///
/// # Errors
///
/// Propagates the first failing stage's error; see [`Error`].
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let options = match &config.include {
        Some(include) => AggregateOptions::new().with_include(include)?,
        None => AggregateOptions::new(),
    };

    let table = aggregate_experiments(&config.files, &options)?;
    let rows = select_rows(&table, &config.pattern, config.match_mode)?;
    let matrix = ExperimentMatrix::pivot(&rows, &config.metric)?;

    let summary = EffectSummary::compute(&matrix)?;
    let decomposition = two_way_decomposition(&matrix)?;

    let gamma_grid = match superposition_gamma_grid(&matrix) {
        Ok(grid) => Some(grid),
        Err(err @ Error::SuperpositionPrecondition { .. }) if !config.require_gamma => {
            warn!(error = %err, "skipping Gamma grid");
            None
        }
        Err(err) => return Err(err),
    };

    let superposition = config
        .superposition
        .map(|points| superposition_check(&matrix, points))
        .transpose()?;

    let baseline = config
        .baseline
        .as_ref()
        .map(|b| {
            // The baseline series is read from every input file; `include`
            // only narrows the analyzed series.
            let unfiltered;
            let source = if config.include.is_some() {
                unfiltered = aggregate_experiments(&config.files, &AggregateOptions::new())?;
                &unfiltered
            } else {
                &table
            };
            let value = resolve_baseline(source, &b.series, b.match_mode, &config.metric, b.mode)?;
            BaselineComparison::compute(value, &matrix)
        })
        .transpose()?;

    info!(
        pattern = %config.pattern,
        metric = %config.metric,
        mu = decomposition.mu(),
        gamma_grid = gamma_grid.is_some(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        pattern: config.pattern.clone(),
        metric: config.metric.clone(),
        matrix,
        summary,
        decomposition,
        gamma_grid,
        superposition,
        baseline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_json() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"files": ["0_1/m.csv"], "pattern": "pg_ape_se3"}"#).unwrap();
        assert_eq!(config.metric, "rmse");
        assert_eq!(config.match_mode, MatchMode::Exact);
        assert!(config.include.is_none());
        assert!(config.superposition.is_none());
    }

    #[test]
    fn test_config_full_json() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{
                "files": ["a/0_1/m.csv"],
                "pattern": "pg_ape",
                "metric": "mean",
                "match_mode": "exact_or_contains",
                "superposition": {"baseline": "0_1", "a": "33_1", "b": "0_10", "ab": "33_10"},
                "baseline": {"series": "zed_ape_se3", "mode": "reference_cell"}
            }"#,
        )
        .unwrap();
        let points = config.superposition.unwrap();
        assert_eq!(points.ab.iters(), 33);
        assert_eq!(points.ab.history(), 10);
        let baseline = config.baseline.unwrap();
        assert_eq!(baseline.mode, BaselineMode::ReferenceCell);
        assert_eq!(baseline.match_mode, MatchMode::Exact);
    }

    #[test]
    fn test_config_bad_label() {
        let result: std::result::Result<AnalysisConfig, _> = serde_json::from_str(
            r#"{"files": [], "pattern": "p",
                "superposition": {"baseline": "0x1", "a": "33_1", "b": "0_10", "ab": "33_10"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::builder(vec![PathBuf::from("0_1/m.csv")], "pg")
            .metric("sse")
            .include("^pg_")
            .match_mode(MatchMode::ExactOrContains)
            .build();
        assert_eq!(config.metric, "sse");
        assert_eq!(config.include.as_deref(), Some("^pg_"));
    }
}
