//! Numerical MLE optimizer.
//!
//! Responsibilities:
//!
//! - define the `Objective` capability the solver consumes
//! - adapt an objective in θ to an argmin problem in `ln θ`
//! - keep every line-search trial within a bounded move of `ln θ`
//! - run BFGS / L-BFGS and report convergence or failure
//! - cross-check the numerical optimum against a closed-form value

pub mod adapter;
pub mod linesearch;
pub mod objective;
pub mod options;
pub mod run;

pub use objective::*;
pub use options::*;
pub use run::*;
