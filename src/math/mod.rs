//! Mathematical core: the Beta(1/θ, 1) density and negative log-likelihood.

pub mod likelihood;

pub use likelihood::*;
