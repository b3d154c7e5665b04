//! The capability the optimizer depends on.
//!
//! An `Objective` is any scalar function of θ > 0 to be minimized. It can
//! optionally supply its own derivative; otherwise the optimizer falls back to
//! finite differences. Swapping the convergence method never touches the
//! objective, and swapping the objective never touches the solver.

use crate::error::EstResult;

pub trait Objective {
    /// Objective value at `theta` (> 0). Domain violations are errors, not
    /// sentinel values.
    fn value(&self, theta: f64) -> EstResult<f64>;

    /// `d value / d theta`, if the objective knows it.
    fn gradient(&self, _theta: f64) -> Option<EstResult<f64>> {
        None
    }

    /// `d value / d ln(theta)`. Override when `θ · value'(θ)` can be formed
    /// without the intermediate overflow of the product.
    fn log_gradient(&self, theta: f64) -> Option<EstResult<f64>> {
        self.gradient(theta).map(|d| d.map(|d| d * theta))
    }

    /// Typical magnitude of the objective (e.g. the sample size for a
    /// negative log-likelihood). The solver works on `value / scale` so its
    /// tolerances do not depend on the size of the data.
    fn scale(&self) -> f64 {
        1.0
    }
}
