//! Plot sinks for the likelihood curve.
//!
//! A sink receives the curve, a marker (the optimized θ̂), and axis labels.
//! Rendering details stay behind the trait; the binary uses the ASCII sink.

pub mod ascii;

pub use ascii::*;

use crate::domain::LikelihoodCurve;

/// Everything a sink needs to draw one likelihood plot.
#[derive(Debug, Clone)]
pub struct PlotRequest<'a> {
    pub curve: &'a LikelihoodCurve,
    pub marker: Option<f64>,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub title: Option<String>,
    pub caption: Option<String>,
    /// Lower clip for the y axis (the log-likelihood drops to -∞ as θ → 0).
    pub y_min: Option<f64>,
}

pub trait PlotSink {
    fn plot(&mut self, request: &PlotRequest<'_>) -> std::io::Result<()>;
}
