//! Export per-estimator results to CSV.
//!
//! One row per estimator, easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::domain::RunConfig;
use crate::error::AppError;

const HEADER: &str = "estimator,theta,alpha,abs_error,theta_true,n,seed,iterations";

/// Write the run's estimates to a CSV file.
pub fn write_estimates_csv(path: &Path, run: &RunOutput, config: &RunConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut w = BufWriter::new(file);
    write_estimates(&mut w, run, config)
        .and_then(|_| w.flush())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))
}

fn write_estimates<W: Write>(w: &mut W, run: &RunOutput, config: &RunConfig) -> std::io::Result<()> {
    writeln!(w, "{HEADER}")?;

    let n = run.sample.len();
    let rows = [
        ("mom", run.mom.theta, run.mom.alpha, None),
        ("mle_closed", run.closed_form.theta, run.closed_form.alpha, None),
        (
            "mle_numeric",
            run.numerical.theta_hat,
            1.0 / run.numerical.theta_hat,
            Some(run.numerical.iterations),
        ),
    ];
    for (name, theta, alpha, iterations) in rows {
        writeln!(
            w,
            "{name},{theta:.10},{alpha:.10},{:.10},{},{n},{},{}",
            (theta - config.theta_true).abs(),
            config.theta_true,
            config.seed,
            iterations.map(|i| i.to_string()).unwrap_or_default(),
        )?;
    }
    Ok(())
}
