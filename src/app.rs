//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the estimation pipeline or the convergence sweep
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, EstimateArgs, PlotArgs, SweepArgs};
use crate::domain::{GridSpec, LikelihoodCurve, RunConfig, SweepConfig};
use crate::error::AppError;
use crate::logging::{LogConfig, init_logging};
use crate::plot::{AsciiPlot, PlotRequest, PlotSink};

pub mod pipeline;

/// Entry point for the `betafit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; anything else is worth a warning once logging is up.
    let dotenv = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(&LogConfig::from_env(cli.log_level, cli.log_format));
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_estimate(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if config.plot {
        let request = PlotRequest {
            curve: &run.curve,
            marker: Some(run.numerical.theta_hat),
            x_label: "theta",
            y_label: "log-likelihood",
            title: Some(format!("Maximum is reached at theta = {:.8}", run.numerical.theta_hat)),
            caption: Some(format!("artificial dataset of size {}", run.sample.len())),
            y_min: args.view.y_min.or_else(|| default_y_floor(&run.curve, run.sample.len())),
        };
        render_plot(&request, config.plot_width, config.plot_height)?;
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_estimates_csv(path, &run, &config)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &run, &config)?;
    }

    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = sweep_config_from_args(&args);
    let rows = pipeline::run_sweep(&config)?;
    println!("{}", crate::report::format_sweep(&rows, &config));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::curve::read_curve_json(&args.curve)?;
    let curve = file.grid.to_curve();

    let request = PlotRequest {
        curve: &curve,
        marker: Some(file.theta_hat),
        x_label: "theta",
        y_label: "log-likelihood",
        title: Some(format!("Maximum is reached at theta = {:.8}", file.theta_hat)),
        caption: Some(format!(
            "artificial dataset of size {} (seed {}, {})",
            file.sample_count,
            file.seed,
            file.method.display_name()
        )),
        y_min: args.view.y_min.or_else(|| default_y_floor(&curve, file.sample_count)),
    };
    render_plot(&request, args.view.width, args.view.height)
}

fn render_plot(request: &PlotRequest<'_>, width: usize, height: usize) -> Result<(), AppError> {
    let mut sink = AsciiPlot::new(std::io::stdout().lock(), width, height);
    sink.plot(request)
        .map_err(|e| AppError::new(2, format!("Failed to write plot: {e}")))
}

/// The log-likelihood falls to -∞ as θ → 0, so clip the axis at 5·n below
/// the grid maximum.
fn default_y_floor(curve: &LikelihoodCurve, n: usize) -> Option<f64> {
    curve.argmax().map(|(_, max)| max - 5.0 * n as f64)
}

pub fn run_config_from_args(args: &EstimateArgs) -> RunConfig {
    RunConfig {
        theta_true: args.sample.theta,
        sample_count: args.sample_count,
        seed: args.seed,
        sampler: args.sample.sampler,
        theta0: args.optim.theta0,
        method: args.optim.method,
        line_search: args.optim.line_search,
        gradient: args.optim.gradient,
        max_iter: args.optim.max_iter,
        agreement_tol: args.agreement_tol,
        grid: GridSpec {
            start: args.grid_start,
            stop: args.grid_stop,
            points: args.grid_points,
            spacing: args.grid_spacing,
        },
        plot: !args.no_plot,
        plot_width: args.view.width,
        plot_height: args.view.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

pub fn sweep_config_from_args(args: &SweepArgs) -> SweepConfig {
    SweepConfig {
        theta_true: args.sample.theta,
        sizes: args.sizes.clone(),
        seeds: args.seeds,
        base_seed: args.base_seed,
        sampler: args.sample.sampler,
        theta0: args.optim.theta0,
        method: args.optim.method,
        line_search: args.optim.line_search,
        gradient: args.optim.gradient,
        max_iter: args.optim.max_iter,
    }
}

/// Rewrite argv so `betafit` defaults to `betafit estimate`.
///
/// Rules:
/// - `betafit`                       -> `betafit estimate`
/// - `betafit --theta 2 ...`         -> `betafit estimate --theta 2 ...`
/// - `betafit --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("estimate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "sweep" | "plot");
    if is_subcommand || !arg1.starts_with('-') {
        return argv;
    }

    // Global flags (`--log-level debug`) may precede the subcommand.
    let has_subcommand = argv[1..]
        .iter()
        .any(|a| matches!(a.as_str(), "estimate" | "sweep" | "plot"));
    if !has_subcommand {
        argv.insert(1, "estimate".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rewrite_defaults_to_estimate() {
        assert_eq!(rewrite_args(argv(&["betafit"])), argv(&["betafit", "estimate"]));
        assert_eq!(
            rewrite_args(argv(&["betafit", "--theta", "2"])),
            argv(&["betafit", "estimate", "--theta", "2"])
        );
    }

    #[test]
    fn rewrite_leaves_explicit_commands_alone() {
        let cases = [
            argv(&["betafit", "sweep", "--seeds", "3"]),
            argv(&["betafit", "--help"]),
            argv(&["betafit", "--log-level", "debug", "plot", "--curve", "c.json"]),
        ];
        for case in cases {
            assert_eq!(rewrite_args(case.clone()), case);
        }
    }

    #[test]
    fn no_plot_flag_wins() {
        let cli = crate::cli::Cli::parse_from(["betafit", "estimate", "--no-plot", "-n", "100"]);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        let config = run_config_from_args(&args);
        assert!(!config.plot);
        assert_eq!(config.sample_count, 100);
        assert_eq!(config.grid.points, 5000);
    }

    #[test]
    fn plot_is_on_unless_disabled() {
        let cli = crate::cli::Cli::parse_from(["betafit", "estimate"]);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert!(run_config_from_args(&args).plot);

        // Plotting has a single switch; there is no `--plot` to pair with it.
        assert!(crate::cli::Cli::try_parse_from(["betafit", "estimate", "--plot"]).is_err());
    }
}
