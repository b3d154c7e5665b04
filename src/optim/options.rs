//! Solver configuration and backend type aliases.

use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::{BFGS, LBFGS},
};
use ndarray::{Array1, Array2};

use crate::domain::{GradientMode, LineSearchKind, OptimMethod};
use crate::error::{Component, EstResult, EstimationError};
use crate::optim::linesearch::StepCapped;

/// Solver parameter: `[φ]` with `φ = ln θ`.
pub type Theta = Array1<f64>;
pub type Grad = Array1<f64>;
/// Inverse-Hessian approximation carried by BFGS.
pub type Hessian = Array2<f64>;
pub type Cost = f64;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type BfgsMoreThuente = BFGS<StepCapped<MoreThuenteLS>, Cost>;
pub type BfgsHagerZhang = BFGS<StepCapped<HagerZhangLS>, Cost>;
pub type LbfgsMoreThuente = LBFGS<StepCapped<MoreThuenteLS>, Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<StepCapped<HagerZhangLS>, Theta, Grad, Cost>;

pub const DEFAULT_MAX_ITER: u64 = 100;
pub const DEFAULT_TOL_GRAD: f64 = 1e-8;
pub const DEFAULT_TOL_COST: f64 = 1e-14;
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Options for the numerical MLE.
#[derive(Debug, Clone, PartialEq)]
pub struct MleOptions {
    pub method: OptimMethod,
    pub line_search: LineSearchKind,
    pub gradient: GradientMode,
    /// Stop when `|∇|` of the scaled objective drops below this.
    pub tol_grad: f64,
    /// Stop when the scaled objective changes by less than this.
    pub tol_cost: f64,
    pub max_iter: u64,
    /// History length for L-BFGS (ignored by BFGS).
    pub lbfgs_mem: usize,
}

impl Default for MleOptions {
    fn default() -> Self {
        Self {
            method: OptimMethod::Bfgs,
            line_search: LineSearchKind::MoreThuente,
            gradient: GradientMode::Analytic,
            tol_grad: DEFAULT_TOL_GRAD,
            tol_cost: DEFAULT_TOL_COST,
            max_iter: DEFAULT_MAX_ITER,
            lbfgs_mem: DEFAULT_LBFGS_MEM,
        }
    }
}

impl MleOptions {
    pub fn with_method(mut self, method: OptimMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_line_search(mut self, line_search: LineSearchKind) -> Self {
        self.line_search = line_search;
        self
    }

    pub fn with_gradient(mut self, gradient: GradientMode) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn with_max_iter(mut self, max_iter: u64) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Reject options the solver cannot run with.
    pub fn validate(&self) -> EstResult<()> {
        if !(self.tol_grad.is_finite() && self.tol_grad >= 0.0) {
            return Err(EstimationError::invalid_domain(
                Component::Optimizer,
                "tol_grad",
                self.tol_grad,
                "must be finite and >= 0",
            ));
        }
        if !(self.tol_cost.is_finite() && self.tol_cost >= 0.0) {
            return Err(EstimationError::invalid_domain(
                Component::Optimizer,
                "tol_cost",
                self.tol_cost,
                "must be finite and >= 0",
            ));
        }
        if self.max_iter == 0 {
            return Err(EstimationError::invalid_domain(
                Component::Optimizer,
                "max_iter",
                0.0,
                "must be > 0",
            ));
        }
        if self.lbfgs_mem == 0 {
            return Err(EstimationError::invalid_domain(
                Component::Optimizer,
                "lbfgs_mem",
                0.0,
                "must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MleOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_iterations_and_negative_tolerances() {
        assert!(MleOptions::default().with_max_iter(0).validate().is_err());

        let mut opts = MleOptions::default();
        opts.tol_grad = -1.0;
        assert!(opts.validate().is_err());

        let mut opts = MleOptions::default();
        opts.tol_cost = f64::NAN;
        assert!(opts.validate().is_err());
    }
}
