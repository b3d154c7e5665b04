//! Shared domain types.
//!
//! These types are intentionally small and immutable:
//!
//! - a validated `Sample` is built once and read by every estimator
//! - estimates, grids, and curves are plain values
//! - the curve file is serializable so a run can be re-plotted later

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Component, EstResult, EstimationError};

/// A fixed-size sample from Beta(1/θ, 1).
///
/// Every value lies in `[0, 1)` and has a finite, negative log. A value is 0
/// only when a sample built with [`Sample::from_ln_values`] underflowed; its
/// log is still exact. The sum and the sum of logs are computed once at
/// construction so estimators and the likelihood never touch the raw values
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
    sum: f64,
    sum_ln: f64,
}

impl Sample {
    /// Validate and wrap raw draws.
    ///
    /// Rejects an empty sample and any value that is not finite or not in the
    /// open interval `(0, 1)` (`ln(0)` is undefined for the likelihood).
    pub fn new(values: Vec<f64>) -> EstResult<Self> {
        if values.is_empty() {
            return Err(EstimationError::degenerate(Component::Sampler, "sample is empty (n = 0)"));
        }
        if let Some((idx, &x)) = values
            .iter()
            .enumerate()
            .find(|(_, x)| !(x.is_finite() && **x > 0.0 && **x < 1.0))
        {
            return Err(EstimationError::degenerate(
                Component::Sampler,
                format!("value x[{idx}] = {x} is outside the open interval (0, 1)"),
            ));
        }

        let sum = values.iter().sum();
        let sum_ln = values.iter().map(|x| x.ln()).sum();
        Ok(Self { values, sum, sum_ln })
    }

    /// Wrap draws given as `ln(x_i)`.
    ///
    /// For a small shape `a` the draw `x` underflows to 0 long before `ln x`
    /// loses precision, so the likelihood reads the logs as given and only
    /// the stored values may round to 0. Rejects an empty sample and any log
    /// that is not finite and `< 0`.
    pub fn from_ln_values(ln_values: Vec<f64>) -> EstResult<Self> {
        if ln_values.is_empty() {
            return Err(EstimationError::degenerate(Component::Sampler, "sample is empty (n = 0)"));
        }
        if let Some((idx, &l)) = ln_values
            .iter()
            .enumerate()
            .find(|(_, l)| !(l.is_finite() && **l < 0.0))
        {
            return Err(EstimationError::degenerate(
                Component::Sampler,
                format!("ln x[{idx}] = {l} is not the log of a value in (0, 1)"),
            ));
        }

        let sum_ln = ln_values.iter().sum();
        let values: Vec<f64> = ln_values.iter().map(|l| l.exp()).collect();
        let sum = values.iter().sum();
        Ok(Self { values, sum, sum_ln })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// `Σ ln(x_i)`; strictly negative for a valid sample.
    pub fn sum_ln(&self) -> f64 {
        self.sum_ln
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.values.len() as f64
    }
}

/// A point estimate `(θ̂, â = 1/θ̂)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub theta: f64,
    pub alpha: f64,
}

impl Estimate {
    /// Build an estimate from θ̂, rejecting non-finite or non-positive values.
    pub fn from_theta(theta: f64, component: Component) -> EstResult<Self> {
        if !(theta.is_finite() && theta > 0.0) {
            return Err(EstimationError::invalid_domain(
                component,
                "theta estimate",
                theta,
                "estimate must be finite and > 0",
            ));
        }
        Ok(Self {
            theta,
            alpha: 1.0 / theta,
        })
    }
}

/// `E[X]` for `X ~ Beta(1/θ, 1)`, i.e. `a / (a + 1)` with `a = 1/θ`.
pub fn theoretical_mean(theta: f64) -> f64 {
    1.0 / (1.0 + theta)
}

/// Spacing of a θ grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GridSpacing {
    Linear,
    Log,
}

/// Grid of candidate θ values for the likelihood surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub start: f64,
    pub stop: f64,
    pub points: usize,
    pub spacing: GridSpacing,
}

/// Ordered `(θ, ℓ(θ))` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodCurve {
    pub points: Vec<(f64, f64)>,
}

impl LikelihoodCurve {
    /// Grid point with the largest log-likelihood (first one on ties).
    pub fn argmax(&self) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for &(theta, value) in &self.points {
            if !value.is_finite() {
                continue;
            }
            match best {
                Some((_, v)) if v >= value => {}
                _ => best = Some((theta, value)),
            }
        }
        best
    }

    pub fn thetas(&self) -> Vec<f64> {
        self.points.iter().map(|&(t, _)| t).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|&(_, v)| v).collect()
    }
}

/// Quasi-Newton method used by the numerical optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimMethod {
    /// Full BFGS with an inverse-Hessian approximation.
    Bfgs,
    /// Limited-memory BFGS.
    Lbfgs,
}

impl OptimMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            OptimMethod::Bfgs => "BFGS",
            OptimMethod::Lbfgs => "L-BFGS",
        }
    }
}

/// Line search used inside the quasi-Newton step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LineSearchKind {
    MoreThuente,
    HagerZhang,
}

impl LineSearchKind {
    pub fn display_name(self) -> &'static str {
        match self {
            LineSearchKind::MoreThuente => "More-Thuente",
            LineSearchKind::HagerZhang => "Hager-Zhang",
        }
    }
}

/// Where the optimizer's gradient comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GradientMode {
    /// Use the objective's own gradient, falling back to finite differences
    /// when it has none.
    Analytic,
    /// Always use central finite differences.
    FiniteDiff,
}

/// Which sampler produces the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    /// Seeded pseudo-random Beta draws.
    Random,
    /// Deterministic stratified quantiles (seed ignored).
    Quantile,
    /// MT19937 stream of NumPy's legacy `RandomState` (32-bit seed).
    Mt19937,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub theta_true: f64,
    pub sample_count: usize,
    pub seed: u64,
    pub sampler: SamplerKind,

    pub theta0: f64,
    pub method: OptimMethod,
    pub line_search: LineSearchKind,
    pub gradient: GradientMode,
    pub max_iter: u64,
    /// Relative tolerance for the closed-form vs numerical MLE check.
    pub agreement_tol: f64,

    pub grid: GridSpec,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

/// Configuration of a convergence sweep (`betafit sweep`).
///
/// Every size is run once per seed in `base_seed..base_seed + seeds`.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub theta_true: f64,
    pub sizes: Vec<usize>,
    pub seeds: u64,
    pub base_seed: u64,
    pub sampler: SamplerKind,

    pub theta0: f64,
    pub method: OptimMethod,
    pub line_search: LineSearchKind,
    pub gradient: GradientMode,
    pub max_iter: u64,
}

/// A saved likelihood curve (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub sample_count: usize,
    pub seed: u64,
    pub theta_true: f64,
    /// Numerically optimized θ̂ (the plot marker).
    pub theta_hat: f64,
    pub method: OptimMethod,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub theta: Vec<f64>,
    pub log_likelihood: Vec<f64>,
}

impl CurveGrid {
    pub fn from_curve(curve: &LikelihoodCurve) -> Self {
        Self {
            theta: curve.thetas(),
            log_likelihood: curve.values(),
        }
    }

    pub fn to_curve(&self) -> LikelihoodCurve {
        LikelihoodCurve {
            points: self
                .theta
                .iter()
                .zip(self.log_likelihood.iter())
                .map(|(&t, &v)| (t, v))
                .collect(),
        }
    }
}
