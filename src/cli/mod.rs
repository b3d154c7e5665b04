//! Command-line parsing for the Beta(1/θ, 1) shape estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code. Every option can also be set through a
//! `BETAFIT_*` environment variable (a `.env` file is loaded first).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{GradientMode, GridSpacing, LineSearchKind, OptimMethod, SamplerKind};
use crate::logging::{LogFormat, LogLevel};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "betafit",
    version,
    about = "Estimate the shape parameter of Beta(1/theta, 1) by MoM and MLE"
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error, off). Logs go to stderr.
    #[arg(long, global = true, env = "BETAFIT_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log format (human, json).
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Draw a sample, run every estimator, cross-check, and plot the likelihood.
    Estimate(EstimateArgs),
    /// Average estimator errors over several seeds for a list of sample sizes.
    Sweep(SweepArgs),
    /// Plot a previously exported likelihood curve JSON.
    Plot(PlotArgs),
}

/// Sampling options shared by `estimate` and `sweep`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// True shape parameter theta (> 0); data are drawn from Beta(1/theta, 1).
    #[arg(long, env = "BETAFIT_THETA", default_value_t = 3.0)]
    pub theta: f64,

    /// Sampler: seeded pseudo-random draws, deterministic quantiles, or the
    /// NumPy-compatible MT19937 stream (seed must fit in 32 bits).
    #[arg(long, value_enum, env = "BETAFIT_SAMPLER", default_value_t = SamplerKind::Random)]
    pub sampler: SamplerKind,
}

/// Numerical optimizer options shared by `estimate` and `sweep`.
#[derive(Debug, Args, Clone)]
pub struct OptimArgs {
    /// Initial guess for the numerical MLE (> 0).
    #[arg(long, env = "BETAFIT_THETA0", default_value_t = 4.0)]
    pub theta0: f64,

    /// Quasi-Newton method.
    #[arg(long, value_enum, env = "BETAFIT_METHOD", default_value_t = OptimMethod::Bfgs)]
    pub method: OptimMethod,

    /// Line search used by the quasi-Newton step.
    #[arg(long, value_enum, env = "BETAFIT_LINE_SEARCH", default_value_t = LineSearchKind::MoreThuente)]
    pub line_search: LineSearchKind,

    /// Gradient source (analytic derivative or central finite differences).
    #[arg(long, value_enum, env = "BETAFIT_GRADIENT", default_value_t = GradientMode::Analytic)]
    pub gradient: GradientMode,

    /// Iteration budget of the optimizer.
    #[arg(long, env = "BETAFIT_MAX_ITER", default_value_t = 100)]
    pub max_iter: u64,
}

/// Options for a single estimation run.
#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub sample: SampleArgs,

    #[command(flatten)]
    pub optim: OptimArgs,

    /// Sample size.
    #[arg(short = 'n', long, env = "BETAFIT_N", default_value_t = 5000)]
    pub sample_count: usize,

    /// Random seed for sample generation.
    #[arg(long, env = "BETAFIT_SEED", default_value_t = 2023)]
    pub seed: u64,

    /// Maximum relative difference allowed between closed-form and numerical MLE.
    #[arg(long, env = "BETAFIT_AGREEMENT_TOL", default_value_t = 1e-4)]
    pub agreement_tol: f64,

    /// First theta of the likelihood grid (> 0).
    #[arg(long, env = "BETAFIT_GRID_START", default_value_t = 0.01)]
    pub grid_start: f64,

    /// Last theta of the likelihood grid.
    #[arg(long, env = "BETAFIT_GRID_STOP", default_value_t = 10.0)]
    pub grid_stop: f64,

    /// Number of grid points.
    #[arg(long, env = "BETAFIT_GRID_POINTS", default_value_t = 5000)]
    pub grid_points: usize,

    /// Grid spacing.
    #[arg(long, value_enum, env = "BETAFIT_GRID_SPACING", default_value_t = GridSpacing::Linear)]
    pub grid_spacing: GridSpacing,

    /// Skip the terminal plot (drawn by default).
    #[arg(long)]
    pub no_plot: bool,

    #[command(flatten)]
    pub view: PlotViewArgs,

    /// Export the estimates to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the likelihood curve (grid + metadata) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for a convergence sweep.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub sample: SampleArgs,

    #[command(flatten)]
    pub optim: OptimArgs,

    /// Sample sizes to evaluate (comma separated).
    #[arg(long, value_delimiter = ',', env = "BETAFIT_SIZES", default_values_t = [100usize, 1000, 10000])]
    pub sizes: Vec<usize>,

    /// Number of seeds per sample size.
    #[arg(long, env = "BETAFIT_SEEDS", default_value_t = 20)]
    pub seeds: u64,

    /// First seed; run k uses `base_seed + k`.
    #[arg(long, env = "BETAFIT_SEED", default_value_t = 2023)]
    pub base_seed: u64,
}

/// Plot size and vertical clipping.
#[derive(Debug, Args, Clone)]
pub struct PlotViewArgs {
    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Lower bound of the log-likelihood axis. Defaults to 5*n below the maximum.
    #[arg(long, allow_hyphen_values = true)]
    pub y_min: Option<f64>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `betafit estimate --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    #[command(flatten)]
    pub view: PlotViewArgs,
}
