//! # sweep-effects: Two-Factor Effect Analysis for Parameter Sweeps
//!
//! Aggregates trajectory-evaluation metrics (rmse, mean, median, std, min,
//! max, sse) from many runs of a two-parameter sweep, where each run lives
//! under a directory named `<iters>_<history>`, and analyzes how the two
//! swept factors contribute to the result.
//!
//! ## Pipeline
//!
//! 1. **Label extraction**: [`ExperimentKey::from_path`](experiment::ExperimentKey::from_path)
//! 2. **Aggregation**: [`aggregate::aggregate_experiments`]
//! 3. **Selection**: [`query::select_rows`]
//! 4. **Pivot**: [`matrix::ExperimentMatrix::pivot`]
//! 5. **Decomposition**: [`decompose`]
//!    - global-mean main effects + interaction residual
//!    - axis-anchored Gamma grid
//!    - four-point superposition check
//!    - baseline delta/ratio
//!
//! ## Design Principles
//!
//! - **Missing is not zero**: absent cells are `None` end to end
//! - **Two named conventions**: grand-mean `gamma` and anchored `Gamma` never substitute for each other
//! - **Local errors**: every failure is scoped to one analysis and carries the path, pattern, metric or coordinate involved
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sweep_effects::analysis::{run, AnalysisConfig};
//! use sweep_effects::query::MatchMode;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     PathBuf::from("sweep/0_1/outputs/metrics.csv"),
//!     PathBuf::from("sweep/10_10/outputs/metrics.csv"),
//! ];
//! let config = AnalysisConfig::builder(files, "pg_ape_se3")
//!     .metric("rmse")
//!     .match_mode(MatchMode::ExactOrContains)
//!     .build();
//!
//! let report = run(&config)?;
//! println!("mu = {}", report.decomposition.mu());
//! # Ok::<(), sweep_effects::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod analysis;
pub mod decompose;
pub mod error;
pub mod experiment;
pub mod matrix;
pub mod query;
pub mod storage;
pub mod tidy;

pub use error::{Error, Result};
