//! Sample generation for Beta(a, b) data.
//!
//! Samplers are the only source of data for the estimators. The seed is an
//! explicit argument of every call: the same `(a, b, n, seed)` always yields
//! the same sample, and no generator state survives between calls.

use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};
use tracing::debug;

use crate::data::mt19937::LegacyRandomState;
use crate::domain::{Sample, SamplerKind};
use crate::error::{Component, EstResult, EstimationError};

/// Produces `n` i.i.d. draws from Beta(a, b).
pub trait Sampler {
    fn sample(&self, a: f64, b: f64, n: usize, seed: u64) -> EstResult<Sample>;
}

/// Seeded pseudo-random sampler (`StdRng` + `rand_distr::Beta`).
///
/// For `b = 1` the draws are made in log space, `ln x = ln(u) / a`, so a small
/// `a` (large θ) keeps every `ln x` exact even where `x` itself underflows.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetaSampler;

impl Sampler for BetaSampler {
    fn sample(&self, a: f64, b: f64, n: usize, seed: u64) -> EstResult<Sample> {
        validate_shape(a, b, n)?;

        if b == 1.0 {
            let inv_a = 1.0 / a;
            let mut rng = StdRng::seed_from_u64(seed);
            let ln_draws: Vec<f64> = (0..n)
                .map(|_| {
                    let u: f64 = rng.sample(Open01);
                    u.ln() * inv_a
                })
                .collect();

            debug!(a, b, n, seed, "generated random Beta sample (log space)");
            return Sample::from_ln_values(ln_draws);
        }

        let beta = Beta::new(a, b).map_err(|_| {
            EstimationError::invalid_domain(Component::Sampler, "shape a", a, "rejected by Beta::new")
        })?;
        let mut rng = StdRng::seed_from_u64(seed);
        let draws: Vec<f64> = (0..n).map(|_| beta.sample(&mut rng)).collect();

        debug!(a, b, n, seed, "generated random Beta sample");
        Sample::new(draws)
    }
}

/// Deterministic sampler: stratified quantiles of Beta(a, 1).
///
/// Uses the inverse CDF `x = u^(1/a)` at `u_i = (i - 1/2) / n`, so the sample is
/// an exact, seed-independent fixture whose moments track the distribution
/// closely. Only `b = 1` has a closed-form quantile.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantileSampler;

impl Sampler for QuantileSampler {
    fn sample(&self, a: f64, b: f64, n: usize, _seed: u64) -> EstResult<Sample> {
        validate_shape(a, b, n)?;
        if b != 1.0 {
            return Err(EstimationError::invalid_domain(
                Component::Sampler,
                "shape b",
                b,
                "quantile sampler supports b = 1 only",
            ));
        }

        let inv_a = 1.0 / a;
        let draws: Vec<f64> = (0..n)
            .map(|i| {
                let u = (i as f64 + 0.5) / n as f64;
                u.powf(inv_a)
            })
            .collect();

        debug!(a, n, "generated quantile Beta sample");
        Sample::new(draws)
    }
}

/// Sampler replaying NumPy's legacy `numpy.random.beta` stream.
///
/// The seed must fit in 32 bits. Draws are made in linear space like the
/// stream they reproduce, so a θ large enough to underflow a draw to 0 is a
/// degenerate sample here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mt19937Sampler;

impl Sampler for Mt19937Sampler {
    fn sample(&self, a: f64, b: f64, n: usize, seed: u64) -> EstResult<Sample> {
        validate_shape(a, b, n)?;
        let seed32 = u32::try_from(seed).map_err(|_| {
            EstimationError::invalid_domain(Component::Sampler, "seed", seed as f64, "MT19937 seeds must fit in 32 bits")
        })?;

        let mut state = LegacyRandomState::new(seed32);
        let draws: Vec<f64> = (0..n).map(|_| state.beta(a, b)).collect();

        debug!(a, b, n, seed, "generated MT19937 Beta sample");
        Sample::new(draws)
    }
}

/// Draw a sample from Beta(1/θ, 1) with the chosen sampler.
pub fn sample_theta(kind: SamplerKind, theta: f64, n: usize, seed: u64) -> EstResult<Sample> {
    if !(theta.is_finite() && theta > 0.0) {
        return Err(EstimationError::invalid_domain(
            Component::Sampler,
            "theta",
            theta,
            "must be finite and > 0",
        ));
    }
    let a = 1.0 / theta;
    match kind {
        SamplerKind::Random => BetaSampler.sample(a, 1.0, n, seed),
        SamplerKind::Quantile => QuantileSampler.sample(a, 1.0, n, seed),
        SamplerKind::Mt19937 => Mt19937Sampler.sample(a, 1.0, n, seed),
    }
}

fn validate_shape(a: f64, b: f64, n: usize) -> EstResult<()> {
    if !(a.is_finite() && a > 0.0) {
        return Err(EstimationError::invalid_domain(Component::Sampler, "shape a", a, "must be finite and > 0"));
    }
    if !(b.is_finite() && b > 0.0) {
        return Err(EstimationError::invalid_domain(Component::Sampler, "shape b", b, "must be finite and > 0"));
    }
    if n == 0 {
        return Err(EstimationError::degenerate(Component::Sampler, "sample size must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let s1 = BetaSampler.sample(1.0 / 3.0, 1.0, 500, 2023).unwrap();
        let s2 = BetaSampler.sample(1.0 / 3.0, 1.0, 500, 2023).unwrap();
        let s3 = BetaSampler.sample(1.0 / 3.0, 1.0, 500, 2024).unwrap();
        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn draws_stay_in_open_unit_interval() {
        let s = BetaSampler.sample(0.5, 2.0, 2000, 7).unwrap();
        assert!(s.values().iter().all(|&x| x > 0.0 && x < 1.0));
    }

    #[test]
    fn mean_of_large_sample_near_one_quarter() {
        // Beta(1/3, 1) has mean 0.25.
        let s = sample_theta(SamplerKind::Random, 3.0, 100_000, 2023).unwrap();
        assert!((s.mean() - 0.25).abs() < 0.01, "mean = {}", s.mean());
    }

    #[test]
    fn invalid_shape_is_domain_error() {
        assert!(matches!(
            BetaSampler.sample(0.0, 1.0, 10, 1),
            Err(EstimationError::InvalidDomain { .. })
        ));
        assert!(matches!(
            BetaSampler.sample(1.0, -1.0, 10, 1),
            Err(EstimationError::InvalidDomain { .. })
        ));
        assert!(matches!(
            sample_theta(SamplerKind::Random, -3.0, 10, 1),
            Err(EstimationError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn zero_size_is_degenerate() {
        assert!(matches!(
            BetaSampler.sample(1.0, 1.0, 0, 1),
            Err(EstimationError::DegenerateSample { .. })
        ));
    }

    #[test]
    fn large_theta_keeps_exact_logs_where_draws_underflow() {
        // θ = 500: u^500 underflows to 0 for u below about 0.23.
        let s = sample_theta(SamplerKind::Random, 500.0, 5000, 3).unwrap();
        assert!(s.values().iter().any(|&x| x == 0.0));
        assert!(s.sum_ln().is_finite() && s.sum_ln() < 0.0);
        let theta_hat = -s.sum_ln() / s.len() as f64;
        assert!((theta_hat - 500.0).abs() < 50.0, "theta_hat = {theta_hat}");
    }

    #[test]
    fn mt19937_sampler_replays_the_legacy_stream() {
        let s = sample_theta(SamplerKind::Mt19937, 3.0, 10, 2023).unwrap();
        assert!((s.values()[0] - 0.036_135_989_554_358_566).abs() < 1e-15);
        assert_eq!(s, Mt19937Sampler.sample(1.0 / 3.0, 1.0, 10, 2023).unwrap());
        assert!(matches!(
            Mt19937Sampler.sample(1.0 / 3.0, 1.0, 10, u64::from(u32::MAX) + 1),
            Err(EstimationError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn quantile_sampler_is_seed_independent_and_ordered() {
        let s1 = QuantileSampler.sample(0.5, 1.0, 100, 1).unwrap();
        let s2 = QuantileSampler.sample(0.5, 1.0, 100, 99).unwrap();
        assert_eq!(s1, s2);
        assert!(s1.values().windows(2).all(|w| w[0] < w[1]));
        assert!(QuantileSampler.sample(0.5, 2.0, 100, 1).is_err());
    }
}
