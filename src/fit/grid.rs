//! θ grid generation for the likelihood surface.
//!
//! Grids are deterministic and strictly inside the parameter domain: every
//! point is finite and `> 0`, since the likelihood is undefined at `θ ≤ 0`.

use crate::domain::{GridSpacing, GridSpec};
use crate::error::{Component, EstResult, EstimationError};

/// Generate the grid described by `spec`.
pub fn theta_grid(spec: &GridSpec) -> EstResult<Vec<f64>> {
    match spec.spacing {
        GridSpacing::Linear => lin_space(spec.start, spec.stop, spec.points),
        GridSpacing::Log => log_space(spec.start, spec.stop, spec.points),
    }
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> EstResult<Vec<f64>> {
    check_range(min, max, steps)?;

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    // Pin the last point so rounding never overshoots the requested bound.
    out[steps - 1] = max;
    Ok(out)
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> EstResult<Vec<f64>> {
    check_range(min, max, steps)?;

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

fn check_range(min: f64, max: f64, steps: usize) -> EstResult<()> {
    if !(min.is_finite() && min > 0.0) {
        return Err(EstimationError::invalid_domain(
            Component::LikelihoodSurface,
            "grid start",
            min,
            "grid bounds must be finite and > 0",
        ));
    }
    if !(max.is_finite() && max > min) {
        return Err(EstimationError::invalid_domain(
            Component::LikelihoodSurface,
            "grid stop",
            max,
            "grid stop must be finite and > start",
        ));
    }
    if steps < 2 {
        return Err(EstimationError::invalid_domain(
            Component::LikelihoodSurface,
            "grid points",
            steps as f64,
            "need at least 2 points",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(0.1, 10.0, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert_eq!(v[4], 10.0);
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn zero_or_negative_bounds_are_rejected() {
        assert!(matches!(
            lin_space(0.0, 10.0, 100),
            Err(EstimationError::InvalidDomain { .. })
        ));
        assert!(log_space(-1.0, 10.0, 100).is_err());
        assert!(lin_space(5.0, 5.0, 10).is_err());
        assert!(lin_space(1.0, 5.0, 1).is_err());
    }
}
