//! End-to-end sweep analysis on a generated sweep directory
//!
//! Lays out a small `<iters>_<history>` sweep in a temporary directory,
//! runs the full analysis and prints the report as JSON.
//!
//! Run with: RUST_LOG=debug cargo run --example sweep_analysis

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sweep_effects::analysis::{run, AnalysisConfig, BaselineConfig};
use sweep_effects::decompose::{BaselineMode, SuperpositionPoints};
use sweep_effects::experiment::ExperimentKey;
use sweep_effects::query::MatchMode;
use tracing_subscriber::EnvFilter;

const SWEEP: [(u64, u64, f64, f64); 6] = [
    (0, 1, 5.0, 6.0),
    (0, 10, 3.0, 6.0),
    (33, 1, 4.0, 8.0),
    (33, 10, 1.5, 10.0),
    (100, 1, 3.8, 7.5),
    (100, 10, 1.6, 9.0),
];

fn write_run(root: &Path, key: ExperimentKey, pg: f64, zed: f64) -> Result<PathBuf> {
    let dir = root.join(key.label()).join("outputs");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("metrics_aligned_se3.csv");
    fs::write(
        &path,
        format!(
            ",rmse,mean,median,std,min,max,sse\n\
             pg_ape_se3.zip,{pg},0.1,0.1,0.01,0.0,0.5,1.0\n\
             zed_ape_se3.zip,{zed},0.2,0.2,0.02,0.0,0.9,2.0\n"
        ),
    )?;
    Ok(path)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let root = tempfile::tempdir()?;
    let files = SWEEP
        .iter()
        .map(|&(i, h, pg, zed)| write_run(root.path(), ExperimentKey::new(i, h), pg, zed))
        .collect::<Result<Vec<_>>>()?;

    let config = AnalysisConfig::builder(files, "pg_ape_se3")
        .match_mode(MatchMode::ExactOrContains)
        .superposition(SuperpositionPoints {
            baseline: ExperimentKey::new(0, 1),
            a: ExperimentKey::new(33, 1),
            b: ExperimentKey::new(0, 10),
            ab: ExperimentKey::new(33, 10),
        })
        .baseline(BaselineConfig {
            series: "zed_ape_se3".to_string(),
            match_mode: MatchMode::ExactOrContains,
            mode: BaselineMode::SeriesMean,
        })
        .build();

    let report = run(&config).context("sweep analysis failed")?;

    println!("{}", report.to_json()?);
    if let Some(check) = &report.superposition {
        println!(
            "interaction at {} = {:+.3} ({})",
            check.points.ab, check.interaction, check.note
        );
    }

    Ok(())
}
