//! Acquisition functions and their maximisation over the Search Space's
//! bounded numeric box.

use rand::{Rng, RngCore};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::gp::GaussianProcess;
use crate::spec::AcquisitionKind;

/// `ucb(x; kappa) = mu(x) + kappa * sigma(x)`.
pub fn ucb(mu: f64, sigma: f64, kappa: f64) -> f64 {
    mu + kappa * sigma
}

/// Expected improvement with trade-off `xi`.
pub fn ei(mu: f64, sigma: f64, f_best: f64, xi: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let z = (mu - f_best - xi) / sigma;
    (mu - f_best - xi) * normal_cdf(z) + sigma * normal_pdf(z)
}

/// Probability of improvement with trade-off `xi`.
pub fn poi(mu: f64, sigma: f64, f_best: f64, xi: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let z = (mu - f_best - xi) / sigma;
    normal_cdf(z)
}

fn normal_pdf(x: f64) -> f64 {
    Normal::standard().pdf(x)
}

fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

pub struct AcquisitionParams {
    pub kind: AcquisitionKind,
    pub kappa: f64,
    pub xi: f64,
}

fn evaluate(params: &AcquisitionParams, gp: &GaussianProcess, f_best: f64, x: &[f64]) -> f64 {
    let (mu, sigma) = gp.predict(x);
    match params.kind {
        AcquisitionKind::Ucb => ucb(mu, sigma, params.kappa),
        AcquisitionKind::Ei => ei(mu, sigma, f_best, params.xi),
        AcquisitionKind::Poi => poi(mu, sigma, f_best, params.xi),
    }
}

/// Random multi-start followed by coordinate-wise hill-climbing, per
/// gradient-free local search. Ties broken by first point discovered.
pub fn maximize(
    params: &AcquisitionParams,
    gp: &GaussianProcess,
    f_best: f64,
    bounds: &[(f64, f64)],
    n_restarts: usize,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    let n_restarts = n_restarts.max(1);
    let mut best_point = random_point(bounds, rng);
    let mut best_score = evaluate(params, gp, f_best, &best_point);

    for _ in 0..n_restarts {
        let start = random_point(bounds, rng);
        let (point, score) = hill_climb(params, gp, f_best, bounds, start, rng);
        if score > best_score {
            best_score = score;
            best_point = point;
        }
    }
    best_point
}

fn random_point(bounds: &[(f64, f64)], rng: &mut dyn RngCore) -> Vec<f64> {
    bounds.iter().map(|(lo, hi)| rng.gen_range(*lo..=*hi)).collect()
}

fn hill_climb(
    params: &AcquisitionParams,
    gp: &GaussianProcess,
    f_best: f64,
    bounds: &[(f64, f64)],
    start: Vec<f64>,
    rng: &mut dyn RngCore,
) -> (Vec<f64>, f64) {
    let mut point = start;
    let mut score = evaluate(params, gp, f_best, &point);
    let mut step_scale = 0.25;

    for _ in 0..40 {
        let dim = rng.gen_range(0..point.len());
        let (lo, hi) = bounds[dim];
        let span = (hi - lo).max(1e-9);
        let delta = rng.gen_range(-1.0..1.0) * step_scale * span;

        let mut candidate = point.clone();
        candidate[dim] = (candidate[dim] + delta).clamp(lo, hi);
        let candidate_score = evaluate(params, gp, f_best, &candidate);

        if candidate_score > score {
            point = candidate;
            score = candidate_score;
        } else {
            step_scale *= 0.9;
        }
    }
    (point, score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ucb_increases_with_kappa() {
        assert!(ucb(1.0, 0.5, 2.0) > ucb(1.0, 0.5, 1.0));
    }

    #[test]
    fn ei_is_zero_at_zero_sigma() {
        assert_eq!(ei(5.0, 0.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn poi_favors_higher_mu() {
        let low = poi(0.0, 1.0, 0.0, 0.0);
        let high = poi(2.0, 1.0, 0.0, 0.0);
        assert!(high > low);
    }

    #[test]
    fn normal_cdf_at_zero_is_half() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
    }
}
