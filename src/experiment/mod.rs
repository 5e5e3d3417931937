//! Experiment data model
//!
//! ## Schema Overview
//!
//! ```text
//! <iters>_<history>/ ... /metrics.csv ──> ExperimentKey
//!                                            │
//! AggregatedTable (1) ──< MetricRow (N) ─────┘
//!                              └── {rmse, mean, median, std, min, max, sse}
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use sweep_effects::experiment::{AggregatedTable, ExperimentKey, MetricRow};
//!
//! let key = ExperimentKey::from_path("sweep/33_10/outputs/metrics.csv")?;
//!
//! let mut table = AggregatedTable::new();
//! table.push(MetricRow::builder("pg_ape_se3", key).metric("rmse", 0.42).build());
//!
//! assert_eq!(table.rows()[0].exp_label(), "33_10");
//! # Ok::<(), sweep_effects::Error>(())
//! ```

mod key;
mod metric_row;
mod table;

pub use key::ExperimentKey;
pub use metric_row::{MetricRow, MetricRowBuilder};
pub use table::AggregatedTable;

/// Metric columns written by trajectory evaluation tools.
pub const STANDARD_METRICS: [&str; 7] = ["rmse", "mean", "median", "std", "min", "max", "sse"];
