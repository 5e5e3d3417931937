//! Error types for sweep-effects
//!
//! Every error is local to a single analysis: the caller can fix the
//! invocation (path, pattern, metric, coordinates) and run again.

use std::path::PathBuf;

use thiserror::Error;

use crate::experiment::ExperimentKey;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// sweep-effects error types
#[derive(Error, Debug)]
pub enum Error {
    /// No ancestor directory of the path is named like `33_10` or `0-1`
    #[error("Could not find experiment label like '33_10' in path parents: {}", path.display())]
    LabelNotFound {
        /// Path that was searched
        path: PathBuf,
    },

    /// Loading and filtering left no rows at all
    #[error("No rows loaded from {files} file(s)\nCheck the input files and the include filter.")]
    EmptyAggregation {
        /// Number of input files that were read
        files: usize,
    },

    /// Row selection matched nothing
    #[error("No rows matched pattern='{pattern}'. Available examples: {available:?} ...")]
    NoMatch {
        /// Requested series name
        pattern: String,
        /// Up to 10 identifying values actually present (sorted)
        available: Vec<String>,
    },

    /// Requested metric column is absent from the selected rows
    #[error("Metric '{metric}' not in columns: {available:?}")]
    MetricNotFound {
        /// Requested metric
        metric: String,
        /// Metric columns present in the selected rows
        available: Vec<String>,
    },

    /// A coordinate needed by a decomposition has no filled cell
    #[error("Missing cell for {role} at (iters={}, history={})", key.iters(), key.history())]
    MissingCell {
        /// Which operand the coordinate plays (`baseline`, `a`, `b`, `ab`)
        role: String,
        /// The requested coordinate
        key: ExperimentKey,
    },

    /// The anchored Gamma grid needs an `iters == 0` row and a `history == 1` column
    #[error("Superposition grid requires iters=0 row and history=1 column; missing: {}", missing.join(", "))]
    SuperpositionPrecondition {
        /// Human-readable list of the absent axis values
        missing: Vec<String>,
    },

    /// A metric file has no column that can identify rows
    #[error("No identifying column in {}", path.display())]
    NoIdentifyingColumn {
        /// Offending file
        path: PathBuf,
    },

    /// Matrix has no filled cell to average over
    #[error("Experiment matrix has no filled cells")]
    EmptyMatrix,

    /// Axes and cells do not describe a valid matrix
    #[error("Invalid experiment matrix: {0}")]
    InvalidMatrix(String),

    /// String is not an `<iters>_<history>` label
    #[error("Invalid experiment label '{0}' (expected '<iters>_<history>', e.g. '33_10')")]
    InvalidLabel(String),

    /// Include filter is not a valid regular expression
    #[error("Invalid include pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Storage error (CSV/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
