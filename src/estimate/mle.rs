//! Closed-form maximum likelihood estimator.
//!
//! `ℓ(θ) = -n·ln(θ) + (1/θ - 1)·Σ ln(x_i)`. Setting `dℓ/dθ = 0`:
//!
//! ```text
//! -n/θ - Σ ln(x_i)/θ² = 0   =>   θ̂ = -Σ ln(x_i) / n
//! ```
//!
//! This is the reference value the numerical optimizer is checked against.

use crate::domain::{Estimate, Sample};
use crate::error::{Component, EstResult, EstimationError};

/// Estimate `(θ̂, â)` in closed form: `θ̂ = -n / Σ ln(x_i)`.
pub fn closed_form_mle(sample: &Sample) -> EstResult<Estimate> {
    let n = sample.len() as f64;
    let sum_ln = sample.sum_ln();

    if sum_ln == 0.0 || !sum_ln.is_finite() {
        return Err(EstimationError::degenerate(
            Component::ClosedFormMle,
            format!("sum of ln(x) is {sum_ln}; closed form needs a finite, non-zero value"),
        ));
    }

    // θ̂ = 1 / (-(n / Σ ln x))
    let theta = 1.0 / (-(n / sum_ln));
    Estimate::from_theta(theta, Component::ClosedFormMle).map_err(|_| {
        EstimationError::degenerate(
            Component::ClosedFormMle,
            format!("sum of ln(x) = {sum_ln} gives non-positive theta {theta}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{QuantileSampler, Sampler, sample_theta};
    use crate::domain::SamplerKind;

    #[test]
    fn matches_negative_mean_log() {
        let xs = vec![0.5f64, 0.25, 0.125];
        let expected = -(xs.iter().map(|x| x.ln()).sum::<f64>()) / 3.0;
        let est = closed_form_mle(&Sample::new(xs).unwrap()).unwrap();
        assert!((est.theta - expected).abs() < 1e-12);
        assert!((est.alpha * est.theta - 1.0).abs() < 1e-12);
    }

    #[test]
    fn quantile_fixture_has_known_bias() {
        // -mean(ln u_i) over the midpoints u_i = (i - 1/2)/n is 1 - ln 2/(2n)
        // up to O(1/n²).
        let n = 5000;
        for theta in [0.2, 3.0, 40.0] {
            let sample = QuantileSampler.sample(1.0 / theta, 1.0, n, 0).unwrap();
            let est = closed_form_mle(&sample).unwrap();
            let expected = theta * (1.0 - std::f64::consts::LN_2 / (2.0 * n as f64));
            assert!((est.theta / expected - 1.0).abs() < 1e-6, "theta = {}", est.theta);
        }
    }

    #[test]
    fn seeded_stream_gives_published_estimate() {
        let sample = sample_theta(SamplerKind::Mt19937, 3.0, 5000, 2023).unwrap();
        let est = closed_form_mle(&sample).unwrap();
        assert!((est.theta - 3.027_229_481_774_75).abs() < 1e-9, "theta = {}", est.theta);
        assert!((est.theta - 3.0272).abs() < 0.01);
    }
}
