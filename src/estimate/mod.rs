//! Point estimators for θ.
//!
//! - `method_of_moments`: sample mean -> θ̂
//! - `closed_form_mle`: stationary point of the log-likelihood -> θ̂
//!
//! The two are independent derivations and are not expected to agree exactly;
//! only the closed-form MLE is used to validate the numerical optimizer.

pub mod mle;
pub mod mom;

pub use mle::*;
pub use mom::*;
