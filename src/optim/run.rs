//! Numerical MLE: run an argmin quasi-Newton solver on an `Objective`.
//!
//! Flow:
//! 1. reject `θ0 ≤ 0` and invalid options before any objective evaluation
//! 2. build the solver for the requested method + line search; every line
//!    search is wrapped in `StepCapped`
//! 3. run it in `φ = ln θ` through `LogThetaAdapter`; BFGS starts from the
//!    inverse Hessian `I / |∇₀|`, so its first step moves `φ` by one unit
//! 4. turn the final state into an `OptimOutcome`. Only `SolverConverged` and
//!    `TargetCostReached` count as success; every other stop is an
//!    `OptimizationFailure`

use argmin::core::{Executor, Gradient, IterState, Solver, State, TerminationReason, TerminationStatus};
use argmin::solver::quasinewton::{BFGS, LBFGS};
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Estimate, LineSearchKind, OptimMethod};
use crate::error::{Component, EstResult, EstimationError};
use crate::optim::adapter::{LogThetaAdapter, to_phi, to_theta};
use crate::optim::linesearch::StepCapped;
use crate::optim::objective::Objective;
use crate::optim::options::{
    BfgsHagerZhang, BfgsMoreThuente, Grad, HagerZhangLS, Hessian, LbfgsHagerZhang, LbfgsMoreThuente, MleOptions,
    MoreThuenteLS, Theta,
};

/// Result of a converged numerical minimization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimOutcome {
    pub theta_hat: f64,
    /// Unscaled objective at `theta_hat` (the NLL for a likelihood).
    pub objective: f64,
    pub iterations: u64,
    /// `|∇|` of the scaled objective in `φ` at the final iterate, if known.
    pub grad_norm: Option<f64>,
    pub termination: String,
    pub method: OptimMethod,
    pub line_search: LineSearchKind,
}

impl OptimOutcome {
    pub fn estimate(&self) -> EstResult<Estimate> {
        Estimate::from_theta(self.theta_hat, Component::Optimizer)
    }
}

/// Final solver state, independent of the solver type.
struct RawOutcome {
    phi_hat: Option<Theta>,
    iterations: u64,
    termination: TerminationStatus,
    grad: Option<Grad>,
}

/// Minimize `f` starting from `theta0` (> 0).
pub fn minimize<F: Objective>(f: &F, theta0: f64, opts: &MleOptions) -> EstResult<OptimOutcome> {
    if !(theta0.is_finite() && theta0 > 0.0) {
        return Err(EstimationError::invalid_domain(
            Component::Optimizer,
            "initial guess theta0",
            theta0,
            "objective is undefined for theta <= 0",
        ));
    }
    opts.validate()?;

    let problem = LogThetaAdapter::new(f, opts.gradient);
    let phi0 = to_phi(theta0);
    debug!(
        theta0,
        method = opts.method.display_name(),
        line_search = ?opts.line_search,
        max_iter = opts.max_iter,
        "starting numerical MLE"
    );

    let raw = match (opts.method, opts.line_search) {
        (OptimMethod::Bfgs, LineSearchKind::MoreThuente) => {
            let solver = configure_bfgs(BfgsMoreThuente::new(StepCapped::new(MoreThuenteLS::new())), opts)?;
            run_bfgs(problem, phi0, opts, solver)
        }
        (OptimMethod::Bfgs, LineSearchKind::HagerZhang) => {
            let solver = configure_bfgs(BfgsHagerZhang::new(StepCapped::new(HagerZhangLS::new())), opts)?;
            run_bfgs(problem, phi0, opts, solver)
        }
        (OptimMethod::Lbfgs, LineSearchKind::MoreThuente) => {
            let solver = configure_lbfgs(
                LbfgsMoreThuente::new(StepCapped::new(MoreThuenteLS::new()), opts.lbfgs_mem),
                opts,
            )?;
            run_lbfgs(problem, phi0, opts, solver)
        }
        (OptimMethod::Lbfgs, LineSearchKind::HagerZhang) => {
            let solver = configure_lbfgs(
                LbfgsHagerZhang::new(StepCapped::new(HagerZhangLS::new()), opts.lbfgs_mem),
                opts,
            )?;
            run_lbfgs(problem, phi0, opts, solver)
        }
    };

    let outcome = raw.and_then(|raw| finish(f, raw, opts));
    match &outcome {
        Ok(o) => info!(
            theta_hat = o.theta_hat,
            objective = o.objective,
            iterations = o.iterations,
            "numerical MLE converged"
        ),
        Err(e) => warn!(error = %e, "numerical MLE failed"),
    }
    outcome
}

/// Check that the numerical optimum agrees with a closed-form reference.
///
/// Returns the relative difference on success.
pub fn cross_check(closed_form: f64, numerical: f64, rel_tol: f64) -> EstResult<f64> {
    let denom = closed_form.abs().max(f64::MIN_POSITIVE);
    let rel = (numerical - closed_form).abs() / denom;
    if rel.is_finite() && rel <= rel_tol {
        Ok(rel)
    } else {
        Err(EstimationError::optimization(
            Component::Optimizer,
            0,
            format!(
                "numerical theta {numerical} disagrees with closed-form {closed_form} \
                 (relative difference {rel:.3e} > {rel_tol:.1e})"
            ),
        ))
    }
}

fn configure_bfgs<L>(
    mut solver: BFGS<L, f64>,
    opts: &MleOptions,
) -> EstResult<BFGS<L, f64>> {
    solver = solver.with_tolerance_grad(opts.tol_grad).map_err(backend_error)?;
    solver = solver.with_tolerance_cost(opts.tol_cost).map_err(backend_error)?;
    Ok(solver)
}

fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, f64>,
    opts: &MleOptions,
) -> EstResult<LBFGS<L, Theta, Grad, f64>> {
    solver = solver.with_tolerance_grad(opts.tol_grad).map_err(backend_error)?;
    solver = solver.with_tolerance_cost(opts.tol_cost).map_err(backend_error)?;
    Ok(solver)
}

fn run_bfgs<'a, F, S>(
    problem: LogThetaAdapter<'a, F>,
    phi0: Theta,
    opts: &MleOptions,
    solver: S,
) -> EstResult<RawOutcome>
where
    F: Objective,
    S: Solver<LogThetaAdapter<'a, F>, IterState<Theta, Grad, (), Hessian, (), f64>> + Send + 'static,
{
    let g0 = problem.gradient(&phi0).map_err(run_error)?;
    let g0_norm = g0.dot(&g0).sqrt();
    let h0 = if g0_norm.is_finite() && g0_norm > 0.0 { 1.0 / g0_norm } else { 1.0 };
    let inv_hessian: Hessian = Array2::eye(phi0.len()) * h0;
    let max_iter = opts.max_iter;
    let result = Executor::new(problem, solver)
        .configure(|state| state.param(phi0).inv_hessian(inv_hessian).max_iters(max_iter))
        .run()
        .map_err(run_error)?;

    let mut state = result.state().clone();
    Ok(RawOutcome {
        iterations: state.get_iter(),
        termination: state.get_termination_status().clone(),
        grad: state.take_gradient(),
        phi_hat: state.take_best_param(),
    })
}

fn run_lbfgs<'a, F, S>(
    problem: LogThetaAdapter<'a, F>,
    phi0: Theta,
    opts: &MleOptions,
    solver: S,
) -> EstResult<RawOutcome>
where
    F: Objective,
    S: Solver<LogThetaAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    let max_iter = opts.max_iter;
    let result = Executor::new(problem, solver)
        .configure(|state| state.param(phi0).max_iters(max_iter))
        .run()
        .map_err(run_error)?;

    let mut state = result.state().clone();
    Ok(RawOutcome {
        iterations: state.get_iter(),
        termination: state.get_termination_status().clone(),
        grad: state.take_gradient(),
        phi_hat: state.take_best_param(),
    })
}

fn finish<F: Objective>(f: &F, raw: RawOutcome, opts: &MleOptions) -> EstResult<OptimOutcome> {
    let iterations = raw.iterations;
    match &raw.termination {
        TerminationStatus::Terminated(TerminationReason::SolverConverged | TerminationReason::TargetCostReached) => {}
        TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
            return Err(EstimationError::optimization(
                Component::Optimizer,
                iterations,
                format!("maximum of {} iterations reached without convergence", opts.max_iter),
            ));
        }
        TerminationStatus::Terminated(reason) => {
            return Err(EstimationError::optimization(
                Component::Optimizer,
                iterations,
                format!("solver stopped before converging: {reason}"),
            ));
        }
        TerminationStatus::NotTerminated => {
            return Err(EstimationError::optimization(
                Component::Optimizer,
                iterations,
                "solver stopped without a termination reason",
            ));
        }
    }

    let Some(phi_hat) = raw.phi_hat else {
        return Err(EstimationError::optimization(
            Component::Optimizer,
            iterations,
            "solver returned no best parameter",
        ));
    };
    let theta_hat = to_theta(&phi_hat).map_err(|e| {
        EstimationError::optimization(Component::Optimizer, iterations, e.to_string())
    })?;

    let objective = f.value(theta_hat)?;
    if !objective.is_finite() {
        return Err(EstimationError::optimization(
            Component::Optimizer,
            iterations,
            format!("non-finite objective {objective} at theta = {theta_hat}"),
        ));
    }

    let grad_norm = raw
        .grad
        .map(|g| g.iter().map(|v| v * v).sum::<f64>().sqrt());

    Ok(OptimOutcome {
        theta_hat,
        objective,
        iterations,
        grad_norm,
        termination: raw.termination.to_string(),
        method: opts.method,
        line_search: opts.line_search,
    })
}

fn backend_error(err: argmin::core::Error) -> EstimationError {
    EstimationError::optimization(Component::Optimizer, 0, format!("solver setup failed: {err}"))
}

/// Recover our own error if the objective raised it; wrap anything else.
fn run_error(err: argmin::core::Error) -> EstimationError {
    match err.downcast::<EstimationError>() {
        Ok(e) => e,
        Err(other) => EstimationError::optimization(Component::Optimizer, 0, other.to_string()),
    }
}
