//! Method of Moments estimator.
//!
//! For `X ~ Beta(a, 1)`, `E[X] = a / (a + 1)`. With `a = 1/θ` this gives
//! `E[X] = 1 / (1 + θ)`, and solving the moment equation for θ:
//!
//! ```text
//! θ̂ = 1 / m - 1,   m = (1/n) Σ x_i
//! ```

use crate::domain::{Estimate, Sample};
use crate::error::{Component, EstResult, EstimationError};

/// Estimate `(θ̂, â)` from the sample mean.
pub fn method_of_moments(sample: &Sample) -> EstResult<Estimate> {
    let moment = sample.mean();

    if !(moment.is_finite() && moment > 0.0) {
        return Err(EstimationError::degenerate(
            Component::MethodOfMoments,
            format!("sample mean {moment} is not > 0"),
        ));
    }
    if moment >= 1.0 {
        return Err(EstimationError::degenerate(
            Component::MethodOfMoments,
            format!("sample mean {moment} is >= 1 (implies theta <= 0)"),
        ));
    }

    let theta = 1.0 / moment - 1.0;
    Estimate::from_theta(theta, Component::MethodOfMoments).map_err(|_| {
        EstimationError::degenerate(
            Component::MethodOfMoments,
            format!("sample mean {moment} gives non-positive theta {theta}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_the_mean() {
        // mean 0.25 -> θ = 3, a = 1/3
        let sample = Sample::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let est = method_of_moments(&sample).unwrap();
        assert!((est.theta - 3.0).abs() < 1e-12);
        assert!((est.alpha - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mean_near_one_gives_small_positive_theta() {
        let sample = Sample::new(vec![0.99, 0.999]).unwrap();
        let est = method_of_moments(&sample).unwrap();
        assert!(est.theta > 0.0 && est.theta < 0.01);
    }
}
