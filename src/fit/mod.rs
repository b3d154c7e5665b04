//! Likelihood surface generation.
//!
//! Responsibilities:
//!
//! - generate θ grids (linear or log spaced, strictly positive)
//! - evaluate the log-likelihood at each grid point (parallel)

pub mod grid;
pub mod surface;

pub use grid::*;
pub use surface::*;
