//! Likelihood surface: `ℓ(θ)` evaluated over a θ grid.
//!
//! Every grid point goes through `NegLogLikelihood::log_likelihood`, the same
//! function the optimizer minimizes, so the curve's maximum sits where the
//! optimizer converges. Points are evaluated independently in parallel; the
//! output keeps the grid order.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{GridSpec, LikelihoodCurve, Sample};
use crate::error::EstResult;
use crate::fit::grid::theta_grid;
use crate::math::NegLogLikelihood;

/// Evaluate the log-likelihood of `sample` over `grid`.
pub fn likelihood_surface(sample: &Sample, grid: &GridSpec) -> EstResult<LikelihoodCurve> {
    let nll = NegLogLikelihood::new(sample);
    surface_for(&nll, grid)
}

/// Evaluate an existing likelihood over `grid`.
pub fn surface_for(nll: &NegLogLikelihood, grid: &GridSpec) -> EstResult<LikelihoodCurve> {
    let thetas = theta_grid(grid)?;

    let points = thetas
        .par_iter()
        .map(|&theta| nll.log_likelihood(theta).map(|ll| (theta, ll)))
        .collect::<EstResult<Vec<(f64, f64)>>>()?;

    debug!(points = points.len(), start = grid.start, stop = grid.stop, "likelihood surface evaluated");
    Ok(LikelihoodCurve { points })
}
