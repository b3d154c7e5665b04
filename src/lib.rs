//! `beta-fit` library crate.
//!
//! Estimates the shape parameter θ of Beta(1/θ, 1) from a sample by the
//! method of moments, the closed-form MLE, and a numerically optimized MLE,
//! and evaluates the log-likelihood surface for plotting.
//!
//! The binary (`betafit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - estimators and the optimizer are reusable on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod optim;
pub mod plot;
pub mod report;
