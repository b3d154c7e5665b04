//! Read/write likelihood curve JSON files.
//!
//! Curve JSON is the "portable" representation of a run's likelihood surface:
//! - run metadata (sample size, seed, true θ, optimizer method)
//! - the optimized θ̂ used as the plot marker
//! - the evaluated `(θ, ℓ(θ))` grid
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;

use crate::app::pipeline::RunOutput;
use crate::domain::{CurveFile, CurveGrid, RunConfig};
use crate::error::AppError;

/// Build the serializable curve file for a finished run.
pub fn curve_file(run: &RunOutput, config: &RunConfig) -> CurveFile {
    CurveFile {
        tool: "betafit".to_string(),
        generated_at: Utc::now(),
        sample_count: run.sample.len(),
        seed: config.seed,
        theta_true: config.theta_true,
        theta_hat: run.numerical.theta_hat,
        method: run.numerical.method,
        grid: CurveGrid::from_curve(&run.curve),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, run: &RunOutput, config: &RunConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &curve_file(run, config))
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;

    if curve.grid.theta.len() != curve.grid.log_likelihood.len() {
        return Err(AppError::new(
            2,
            format!(
                "Invalid curve JSON: {} theta values but {} log-likelihood values",
                curve.grid.theta.len(),
                curve.grid.log_likelihood.len()
            ),
        ));
    }
    Ok(curve)
}
