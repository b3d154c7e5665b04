//! Shared estimation pipeline used by the `estimate` and `sweep` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sample -> MoM + closed-form MLE -> numerical MLE -> cross-check -> likelihood surface
//!
//! The CLI can then focus on presentation (printing, plotting, exports).

use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::data::sample_theta;
use crate::domain::{Estimate, LikelihoodCurve, RunConfig, Sample, SweepConfig};
use crate::error::{AppError, EstResult};
use crate::estimate::{closed_form_mle, method_of_moments};
use crate::fit::surface_for;
use crate::math::NegLogLikelihood;
use crate::optim::{MleOptions, OptimOutcome, cross_check, minimize};

/// All computed outputs of a single `betafit estimate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: Sample,
    pub mom: Estimate,
    pub closed_form: Estimate,
    pub numerical: OptimOutcome,
    /// Relative difference between the closed-form and numerical θ̂.
    pub agreement: f64,
    pub curve: LikelihoodCurve,
}

/// Mean absolute θ error of each estimator at one sample size.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub sample_count: usize,
    pub runs: usize,
    pub mom_mae: f64,
    pub closed_form_mae: f64,
    pub numerical_mae: f64,
}

/// Execute the full estimation pipeline and return the computed outputs.
pub fn run_estimate(config: &RunConfig) -> Result<RunOutput, AppError> {
    let _span = info_span!("estimate", n = config.sample_count, seed = config.seed).entered();

    // 1) Draw the sample.
    let sample = sample_theta(config.sampler, config.theta_true, config.sample_count, config.seed)?;
    debug!(mean = sample.mean(), sum_ln = sample.sum_ln(), "sample drawn");

    // 2) Independent closed-form estimators.
    let mom = method_of_moments(&sample)?;
    let closed_form = closed_form_mle(&sample)?;

    // 3) Numerical MLE and its consistency check against the closed form.
    let nll = NegLogLikelihood::new(&sample);
    let options = MleOptions::default()
        .with_method(config.method)
        .with_line_search(config.line_search)
        .with_gradient(config.gradient)
        .with_max_iter(config.max_iter);
    let numerical = minimize(&nll, config.theta0, &options)?;
    let agreement = cross_check(closed_form.theta, numerical.theta_hat, config.agreement_tol)?;

    // 4) Likelihood surface for plotting.
    let curve = surface_for(&nll, &config.grid)?;

    info!(
        mom = mom.theta,
        closed_form = closed_form.theta,
        numerical = numerical.theta_hat,
        agreement,
        "estimation finished"
    );

    Ok(RunOutput {
        sample,
        mom,
        closed_form,
        numerical,
        agreement,
        curve,
    })
}

/// Absolute θ errors of one (size, seed) run.
#[derive(Debug, Clone, Copy)]
struct RunErrors {
    mom: f64,
    closed_form: f64,
    numerical: f64,
}

/// Run every estimator for each (size, seed) pair and average the absolute
/// errors per size.
///
/// Runs are independent and execute in parallel; rows come back in the order
/// of `config.sizes`.
pub fn run_sweep(config: &SweepConfig) -> Result<Vec<SweepRow>, AppError> {
    if config.sizes.is_empty() {
        return Err(AppError::new(2, "Sweep needs at least one sample size."));
    }
    if config.seeds == 0 {
        return Err(AppError::new(2, "Sweep needs at least one seed."));
    }

    let options = MleOptions::default()
        .with_method(config.method)
        .with_line_search(config.line_search)
        .with_gradient(config.gradient)
        .with_max_iter(config.max_iter);

    let jobs: Vec<(usize, u64)> = config
        .sizes
        .iter()
        .flat_map(|&n| (0..config.seeds).map(move |k| (n, config.base_seed.wrapping_add(k))))
        .collect();
    info!(sizes = config.sizes.len(), seeds = config.seeds, runs = jobs.len(), "starting sweep");

    let errors = jobs
        .par_iter()
        .map(|&(n, seed)| sweep_one(config, &options, n, seed))
        .collect::<EstResult<Vec<RunErrors>>>()?;

    let per_size = config.seeds as usize;
    let rows = config
        .sizes
        .iter()
        .zip(errors.chunks(per_size))
        .map(|(&n, chunk)| {
            let runs = chunk.len() as f64;
            SweepRow {
                sample_count: n,
                runs: chunk.len(),
                mom_mae: chunk.iter().map(|e| e.mom).sum::<f64>() / runs,
                closed_form_mae: chunk.iter().map(|e| e.closed_form).sum::<f64>() / runs,
                numerical_mae: chunk.iter().map(|e| e.numerical).sum::<f64>() / runs,
            }
        })
        .collect();

    Ok(rows)
}

fn sweep_one(config: &SweepConfig, options: &MleOptions, n: usize, seed: u64) -> EstResult<RunErrors> {
    let sample = sample_theta(config.sampler, config.theta_true, n, seed)?;
    let mom = method_of_moments(&sample)?;
    let closed_form = closed_form_mle(&sample)?;
    let numerical = minimize(&NegLogLikelihood::new(&sample), config.theta0, options)?;

    Ok(RunErrors {
        mom: (mom.theta - config.theta_true).abs(),
        closed_form: (closed_form.theta - config.theta_true).abs(),
        numerical: (numerical.theta_hat - config.theta_true).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GradientMode, GridSpacing, GridSpec, LineSearchKind, OptimMethod, SamplerKind};

    fn config(sampler: SamplerKind) -> RunConfig {
        RunConfig {
            theta_true: 3.0,
            sample_count: 5000,
            seed: 7,
            sampler,
            theta0: 1.0,
            method: OptimMethod::Bfgs,
            line_search: LineSearchKind::MoreThuente,
            gradient: GradientMode::Analytic,
            max_iter: 100,
            agreement_tol: 1e-4,
            grid: GridSpec {
                start: 0.05,
                stop: 10.0,
                points: 400,
                spacing: GridSpacing::Linear,
            },
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_curve: None,
        }
    }

    #[test]
    fn estimate_pipeline_runs_end_to_end() {
        let run = run_estimate(&config(SamplerKind::Random)).unwrap();
        assert_eq!(run.sample.len(), 5000);
        assert!(run.agreement <= 1e-4);
        assert_eq!(run.curve.points.len(), 400);
        assert!((run.closed_form.theta - 3.0).abs() < 0.3);
        assert!((run.mom.theta - 3.0).abs() < 0.3);
    }

    #[test]
    fn mt19937_pipeline_reproduces_fixed_seed_run() {
        let mut cfg = config(SamplerKind::Mt19937);
        cfg.seed = 2023;
        let run = run_estimate(&cfg).unwrap();
        assert!((run.closed_form.theta - 3.027_229_481_774_75).abs() < 1e-9, "{}", run.closed_form.theta);
        assert!((run.numerical.theta_hat - 3.0272).abs() < 0.01);
        assert!((run.numerical.theta_hat - run.closed_form.theta).abs() < 1e-3);
    }

    #[test]
    fn quantile_pipeline_runs_without_a_seed() {
        let run = run_estimate(&config(SamplerKind::Quantile)).unwrap();
        assert!((run.closed_form.theta - 3.0).abs() < 0.01, "{}", run.closed_form.theta);
    }

    #[test]
    fn bad_initial_guess_maps_to_domain_exit_code() {
        let mut cfg = config(SamplerKind::Random);
        cfg.theta0 = 0.0;
        let err = run_estimate(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn sweep_rows_follow_size_order() {
        let sweep = SweepConfig {
            theta_true: 3.0,
            sizes: vec![1000, 100],
            seeds: 4,
            base_seed: 11,
            sampler: SamplerKind::Random,
            theta0: 1.0,
            method: OptimMethod::Lbfgs,
            line_search: LineSearchKind::MoreThuente,
            gradient: GradientMode::Analytic,
            max_iter: 100,
        };
        let rows = run_sweep(&sweep).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sample_count, 1000);
        assert_eq!(rows[1].sample_count, 100);
        assert!(rows.iter().all(|r| r.runs == 4));
        for r in &rows {
            assert!((r.closed_form_mae - r.numerical_mae).abs() < 1e-2);
        }
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let sweep = SweepConfig {
            theta_true: 3.0,
            sizes: vec![],
            seeds: 4,
            base_seed: 0,
            sampler: SamplerKind::Random,
            theta0: 1.0,
            method: OptimMethod::Bfgs,
            line_search: LineSearchKind::MoreThuente,
            gradient: GradientMode::Analytic,
            max_iter: 100,
        };
        assert_eq!(run_sweep(&sweep).unwrap_err().exit_code(), 2);
    }
}
