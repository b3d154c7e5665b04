//! Bridge from an `Objective` in θ to an argmin problem in `φ = ln θ`.
//!
//! - Every trial point `φ` maps to `θ = exp(φ) > 0`. Points where `exp(φ)`
//!   leaves `(0, ∞)`, or where the objective is not finite, cost `+∞`; their
//!   gradient is NaN and never enters a solver update.
//! - The cost is `value(θ) / scale` and its gradient is the objective's
//!   `d value / d ln θ` over `scale`, so no `θ²` term is ever formed.
//! - Without an analytic derivative (or when finite differences are forced),
//!   the gradient is a central difference of the cost in `φ`.

use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use ndarray::Array1;

use crate::domain::GradientMode;
use crate::error::{Component, EstimationError};
use crate::optim::objective::Objective;
use crate::optim::options::{Cost, Grad, Theta};

#[derive(Debug, Clone)]
pub struct LogThetaAdapter<'a, F: Objective> {
    f: &'a F,
    scale: f64,
    gradient: GradientMode,
}

impl<'a, F: Objective> LogThetaAdapter<'a, F> {
    pub fn new(f: &'a F, gradient: GradientMode) -> Self {
        let scale = f.scale();
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self { f, scale, gradient }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Solver coordinate for a given θ.
pub fn to_phi(theta: f64) -> Theta {
    Array1::from_elem(1, theta.ln())
}

/// θ for a solver coordinate; fails if `exp(φ)` leaves `(0, ∞)`.
pub fn to_theta(phi: &Theta) -> Result<f64, EstimationError> {
    trial_theta(phi)?.ok_or_else(|| {
        EstimationError::optimization(
            Component::Optimizer,
            0,
            format!("ln(theta) = {} maps outside (0, inf)", phi[0]),
        )
    })
}

/// θ for a trial point, or `None` when `exp(φ)` is not a usable θ.
fn trial_theta(phi: &Theta) -> Result<Option<f64>, EstimationError> {
    if phi.len() != 1 {
        return Err(EstimationError::optimization(
            Component::Optimizer,
            0,
            format!("expected a 1-dimensional parameter, got {}", phi.len()),
        ));
    }
    let theta = phi[0].exp();
    Ok((theta.is_finite() && theta > 0.0).then_some(theta))
}

impl<'a, F: Objective> CostFunction for LogThetaAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, phi: &Self::Param) -> Result<Self::Output, Error> {
        let Some(theta) = trial_theta(phi)? else {
            return Ok(f64::INFINITY);
        };
        match self.f.value(theta) {
            Ok(value) if value.is_finite() => Ok(value / self.scale),
            Ok(_) | Err(EstimationError::InvalidDomain { .. }) => Ok(f64::INFINITY),
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: Objective> Gradient for LogThetaAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, phi: &Self::Param) -> Result<Self::Gradient, Error> {
        let Some(theta) = trial_theta(phi)? else {
            return Ok(Array1::from_elem(1, f64::NAN));
        };
        if self.gradient == GradientMode::Analytic {
            if let Some(d) = self.f.log_gradient(theta) {
                let g = d? / self.scale;
                check_grad(g)?;
                return Ok(Array1::from_elem(1, g));
            }
        }
        self.finite_diff(phi)
    }
}

impl<'a, F: Objective> LogThetaAdapter<'a, F> {
    fn finite_diff(&self, phi: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |p: &Theta| -> f64 {
            match self.cost(p) {
                Ok(val) => val,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let fd_grad = phi.central_diff(&cost_func);
        if let Some(err) = closure_err.take() {
            return Err(err);
        }
        for &g in fd_grad.iter() {
            check_grad(g)?;
        }
        Ok(fd_grad)
    }
}

fn check_grad(g: f64) -> Result<(), EstimationError> {
    if g.is_finite() {
        Ok(())
    } else {
        Err(EstimationError::optimization(
            Component::Optimizer,
            0,
            format!("non-finite gradient {g}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{QuantileSampler, Sampler};
    use crate::error::EstResult;
    use crate::math::NegLogLikelihood;

    /// `(θ - 2)²` with no analytic gradient.
    struct Quadratic;

    impl Objective for Quadratic {
        fn value(&self, theta: f64) -> EstResult<f64> {
            Ok((theta - 2.0).powi(2))
        }
    }

    #[test]
    fn phi_round_trips_theta() {
        let theta = to_theta(&to_phi(3.5)).unwrap();
        assert!((theta - 3.5).abs() < 1e-12);
    }

    #[test]
    fn overflowing_phi_is_rejected() {
        assert!(to_theta(&Array1::from_elem(1, 1000.0)).is_err());
        assert!(to_theta(&Array1::from_elem(2, 0.0)).is_err());
    }

    #[test]
    fn points_outside_the_domain_cost_infinity() {
        let sample = QuantileSampler.sample(1.0 / 3.0, 1.0, 1000, 0).unwrap();
        let nll = NegLogLikelihood::new(&sample);
        let adapter = LogThetaAdapter::new(&nll, GradientMode::Analytic);
        for phi in [1000.0, -1000.0, f64::NAN] {
            let p = Array1::from_elem(1, phi);
            assert_eq!(adapter.cost(&p).unwrap(), f64::INFINITY, "phi = {phi}");
            assert!(adapter.gradient(&p).unwrap()[0].is_nan());
        }
        // θ = e^-720 is representable but NLL/n ≈ 3·e^720 is not.
        let p = Array1::from_elem(1, -720.0);
        assert_eq!(adapter.cost(&p).unwrap(), f64::INFINITY);
    }

    #[test]
    fn analytic_gradient_has_no_theta_squared_overflow() {
        let sample = QuantileSampler.sample(1.0 / 3.0, 1.0, 5000, 0).unwrap();
        let nll = NegLogLikelihood::new(&sample);
        let adapter = LogThetaAdapter::new(&nll, GradientMode::Analytic);
        // 1 + (Σ ln x / n)·e^-φ at φ = -400, where θ² underflows to 0.
        let phi = -400.0;
        let g = adapter.gradient(&Array1::from_elem(1, phi)).unwrap()[0];
        let expected = 1.0 + sample.sum_ln() / 5000.0 * (-phi).exp();
        assert!(g.is_finite());
        assert!((g - expected).abs() <= 1e-12 * expected.abs(), "{g} vs {expected}");
    }

    #[test]
    fn finite_difference_fallback_applies_chain_rule() {
        let adapter = LogThetaAdapter::new(&Quadratic, GradientMode::Analytic);
        let phi = to_phi(3.0);
        // d/dφ (e^φ - 2)² = 2 (θ - 2) θ = 6 at θ = 3
        let g = adapter.gradient(&phi).unwrap();
        assert!((g[0] - 6.0).abs() < 1e-5, "g = {}", g[0]);
    }
}
