//! Log-likelihood of the Beta(1/θ, 1) family.
//!
//! For `x ∈ (0, 1)` and `a = 1/θ` the density is `a · x^(a-1)`, so
//!
//! ```text
//! log f(x; θ) = ln(a) + (a - 1) · ln(x)
//! NLL(θ)      = -Σ_i log f(x_i; θ) = -(n · ln(a) + (a - 1) · Σ_i ln(x_i))
//! ```
//!
//! The sample enters only through `n` and `Σ ln(x_i)`, which `Sample` caches.
//! `NegLogLikelihood` is the one place this formula lives: the optimizer and
//! the likelihood surface both evaluate it, so their values are identical.

use crate::domain::Sample;
use crate::error::{Component, EstResult, EstimationError};
use crate::optim::Objective;

/// Log-density of Beta(1/θ, 1) at `x`.
///
/// Returns `-∞` for `x` outside the open support `(0, 1)`.
pub fn log_pdf(x: f64, theta: f64) -> EstResult<f64> {
    check_theta(theta)?;
    if !(x > 0.0 && x < 1.0) {
        return Ok(f64::NEG_INFINITY);
    }
    let a = 1.0 / theta;
    Ok(a.ln() + (a - 1.0) * x.ln())
}

/// Negative log-likelihood over a fixed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegLogLikelihood {
    n: f64,
    sum_ln: f64,
}

impl NegLogLikelihood {
    pub fn new(sample: &Sample) -> Self {
        Self {
            n: sample.len() as f64,
            sum_ln: sample.sum_ln(),
        }
    }

    /// Number of observations behind the likelihood.
    pub fn n(&self) -> f64 {
        self.n
    }

    /// `NLL(θ)`. Fails with `InvalidDomain` for `θ ≤ 0` or non-finite θ.
    pub fn value(&self, theta: f64) -> EstResult<f64> {
        check_theta(theta)?;
        let a = 1.0 / theta;
        Ok(-(self.n * a.ln() + (a - 1.0) * self.sum_ln))
    }

    /// `dNLL/dθ = n/θ + Σ ln(x_i) / θ²`.
    pub fn derivative(&self, theta: f64) -> EstResult<f64> {
        check_theta(theta)?;
        Ok(self.n / theta + self.sum_ln / (theta * theta))
    }

    /// `dNLL/d ln θ = n + Σ ln(x_i) / θ`.
    pub fn log_derivative(&self, theta: f64) -> EstResult<f64> {
        check_theta(theta)?;
        Ok(self.n + self.sum_ln / theta)
    }

    /// `ℓ(θ) = -NLL(θ)`, the value plotted by the likelihood surface.
    pub fn log_likelihood(&self, theta: f64) -> EstResult<f64> {
        self.value(theta).map(|v| -v)
    }
}

impl Objective for NegLogLikelihood {
    fn value(&self, theta: f64) -> EstResult<f64> {
        NegLogLikelihood::value(self, theta)
    }

    fn gradient(&self, theta: f64) -> Option<EstResult<f64>> {
        Some(self.derivative(theta))
    }

    fn log_gradient(&self, theta: f64) -> Option<EstResult<f64>> {
        Some(self.log_derivative(theta))
    }

    fn scale(&self) -> f64 {
        self.n
    }
}

fn check_theta(theta: f64) -> EstResult<()> {
    if !(theta.is_finite() && theta > 0.0) {
        return Err(EstimationError::invalid_domain(
            Component::LogLikelihood,
            "theta",
            theta,
            "log-likelihood is defined for theta > 0 only",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{QuantileSampler, Sampler};
    use proptest::prelude::*;

    fn fixture(theta: f64, n: usize) -> Sample {
        QuantileSampler.sample(1.0 / theta, 1.0, n, 0).unwrap()
    }

    #[test]
    fn nll_equals_sum_of_point_densities() {
        let sample = fixture(3.0, 1000);
        let nll = NegLogLikelihood::new(&sample);
        for &theta in &[0.5, 1.0, 3.0, 7.5] {
            let direct: f64 = sample
                .values()
                .iter()
                .map(|&x| log_pdf(x, theta).unwrap())
                .sum();
            let v = nll.value(theta).unwrap();
            assert!(
                (v + direct).abs() <= 1e-9 * direct.abs().max(1.0),
                "theta={theta}: nll={v}, -sum logpdf={}",
                -direct
            );
        }
    }

    #[test]
    fn non_positive_theta_is_domain_error() {
        let nll = NegLogLikelihood::new(&fixture(3.0, 10));
        for &theta in &[0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                nll.value(theta),
                Err(EstimationError::InvalidDomain {
                    component: Component::LogLikelihood,
                    ..
                })
            ));
        }
        assert!(log_pdf(0.5, 0.0).is_err());
    }

    #[test]
    fn log_pdf_outside_support_is_neg_infinity() {
        assert_eq!(log_pdf(0.0, 2.0).unwrap(), f64::NEG_INFINITY);
        assert_eq!(log_pdf(1.5, 2.0).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn uniform_case_has_zero_log_density() {
        // θ = 1 is Beta(1, 1): log f(x) = 0 everywhere on (0, 1).
        assert_eq!(log_pdf(0.3, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn derivative_vanishes_at_closed_form_mle() {
        let sample = fixture(2.0, 500);
        let nll = NegLogLikelihood::new(&sample);
        let theta_hat = -sample.sum_ln() / sample.len() as f64;
        assert!(nll.derivative(theta_hat).unwrap().abs() < 1e-9);
    }

    #[test]
    fn log_derivative_is_finite_where_the_theta_derivative_overflows() {
        let nll = NegLogLikelihood::new(&fixture(3.0, 5000));
        let theta = 1e-160;
        assert!(!nll.derivative(theta).unwrap().is_finite());
        let g = nll.log_derivative(theta).unwrap();
        assert!(g.is_finite() && g < 0.0, "g = {g}");
    }

    proptest! {
        #[test]
        fn derivative_matches_central_difference(theta in 0.1f64..20.0) {
            let nll = NegLogLikelihood::new(&fixture(3.0, 200));
            let h = 1e-6 * theta;
            let fd = (nll.value(theta + h).unwrap() - nll.value(theta - h).unwrap()) / (2.0 * h);
            let an = nll.derivative(theta).unwrap();
            prop_assert!((fd - an).abs() <= 1e-4 * an.abs().max(1.0), "fd={} an={}", fd, an);
        }

        #[test]
        fn log_derivative_is_theta_times_derivative(theta in 0.1f64..20.0) {
            let nll = NegLogLikelihood::new(&fixture(3.0, 200));
            let lhs = nll.log_derivative(theta).unwrap();
            let rhs = theta * nll.derivative(theta).unwrap();
            prop_assert!((lhs - rhs).abs() <= 1e-9 * rhs.abs().max(1.0), "lhs={} rhs={}", lhs, rhs);
        }

        #[test]
        fn nll_is_finite_on_positive_axis(theta in 1e-3f64..1e3) {
            let nll = NegLogLikelihood::new(&fixture(0.7, 50));
            prop_assert!(nll.value(theta).unwrap().is_finite());
        }
    }
}
